use crate::areas::changescripts::ChangescriptSource;
use crate::areas::repository::Repository;
use crate::artifacts::changescript::script_id::ScriptId;

impl Repository {
    pub fn show(&self, id: &str) -> anyhow::Result<()> {
        let id = ScriptId::try_parse(id)?;
        let statement = self.scripts().content_of(&id)?;

        write!(self.writer(), "{}", statement)?;

        Ok(())
    }
}
