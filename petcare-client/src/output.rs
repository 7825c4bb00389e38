use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::server::PetcareApi;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// The payload as JSON, no tables.
    Raw,
    Table,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json { OutputMode::Raw } else { OutputMode::Table }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// Raw payload written and session closed; the command is done.
    Emitted,
    /// Caller builds and prints rows.
    Render,
}

/// In raw mode closes the session, writes `payload` verbatim and returns
/// [`Routed::Emitted`]; the caller must return without building rows.
pub async fn route<A, T, W>(
    session: &Session<A>,
    mode: OutputMode,
    payload: &T,
    out: &mut W,
) -> Result<Routed>
where
    A: PetcareApi,
    T: Serialize + ?Sized,
    W: Write,
{
    match mode {
        OutputMode::Table => Ok(Routed::Render),
        OutputMode::Raw => {
            session.close().await;
            serde_json::to_writer_pretty(&mut *out, payload)?;
            writeln!(out)?;
            Ok(Routed::Emitted)
        }
    }
}
