//! Pager installation.

use super::CliSession;
use super::options::CommandOptions;
use super::state::ActivePager;
use crate::error::Result;
use crate::mode::Mode;
use crate::transport::Transport;

impl<T: Transport> CliSession<T> {
    /// Install the pager of `mode`, replacing whatever was installed.
    ///
    /// Avoid commands run in `mode` right away. They only exist to switch
    /// pagination off, so their failures are logged and dropped.
    pub(super) fn apply_pager(&mut self, mode: &Mode, label: &str) -> Result<()> {
        self.state.set_pager(None);
        let Some(pager) = &mode.pager else {
            return Ok(());
        };
        pager.validate(label)?;

        if let (Some(detect), Some(response)) = (&pager.detect, &pager.response) {
            self.state.set_pager(Some(ActivePager {
                detect: detect.clone(),
                response: response.clone(),
            }));
        }

        for command in &pager.avoid {
            if let Err(err) = self.execute(command, mode, &CommandOptions::default()) {
                tracing::debug!(mode = %label, command = %command, error = %err, "Pager avoid command failed");
            }
        }
        Ok(())
    }
}
