//! One handler per subcommand. Each owns the session it is given and closes it
//! exactly once, whichever way it returns.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;

use crate::auth::{CredentialResolver, TokenRotation};
use crate::control::{self, ControlOutcome};
use crate::error::PetcareError;
use crate::notification::{self, NotificationTable};
use crate::output::{self, OutputMode, Routed};
use crate::report::{self, ReportRow};
use crate::server::{LockMode, PetLocation, PetcareApi};
use crate::session::Session;
use crate::tui::table::{Column, render_table};
use crate::tui::{devices, pets};
use crate::util::format::{accent, bold, green, rule, yellow};

/// Where a command writes and how.
pub struct Console<W: Write> {
    pub out: W,
    pub mode: OutputMode,
    pub width: Option<usize>,
}

impl<W: Write> Console<W> {
    pub fn new(out: W, mode: OutputMode, width: Option<usize>) -> Self {
        Self { out, mode, width }
    }

    fn rule_width(&self) -> usize {
        self.width.unwrap_or(80).min(100)
    }
}

async fn route<A: PetcareApi, W: Write, T: serde::Serialize + ?Sized>(
    session: &Session<A>,
    console: &mut Console<W>,
    payload: &T,
) -> Result<Routed> {
    output::route(session, console.mode, payload, &mut console.out).await
}

pub async fn token<A: PetcareApi, W: Write>(
    session: &Session<A>,
    console: &mut Console<W>,
    resolver: &CredentialResolver,
    user: &str,
    password: &str,
) -> Result<()> {
    session
        .scoped(run_token(session, console, resolver, user, password))
        .await
}

async fn run_token<A: PetcareApi, W: Write>(
    session: &Session<A>,
    console: &mut Console<W>,
    resolver: &CredentialResolver,
    user: &str,
    password: &str,
) -> Result<()> {
    let token = session
        .get_token(user, password)
        .await
        .map_err(PetcareError::remote)?;

    match resolver.persist(&token)? {
        TokenRotation::Created => info!("Token saved to {:?}", resolver.store().primary()),
        TokenRotation::Unchanged => info!("Token unchanged"),
        TokenRotation::Rotated => info!(
            "Token saved, previous one moved to {:?}",
            resolver.store().backup()
        ),
    }

    if route(session, console, &json!({ "token": token })).await? == Routed::Emitted {
        return Ok(());
    }

    let width = console.rule_width();
    let title = format!("{} {} {}", bold(user), accent("·"), bold("Token"));
    writeln!(console.out, "{}", rule(Some(&title), width))?;
    writeln!(console.out, "{}", bold(&token))?;
    writeln!(console.out, "{}", rule(None, width))?;
    Ok(())
}

pub async fn pets<A: PetcareApi, W: Write>(
    session: &Session<A>,
    console: &mut Console<W>,
) -> Result<()> {
    session.scoped(run_pets(session, console)).await
}

async fn run_pets<A: PetcareApi, W: Write>(
    session: &Session<A>,
    console: &mut Console<W>,
) -> Result<()> {
    let entities = session
        .fetch_entities()
        .await
        .map_err(PetcareError::remote)?;

    if route(session, console, &entities.pets).await? == Routed::Emitted {
        return Ok(());
    }

    write!(console.out, "{}", pets::pets_table(&entities.pets, console.width))?;
    Ok(())
}

pub async fn devices<A: PetcareApi, W: Write>(
    session: &Session<A>,
    console: &mut Console<W>,
) -> Result<()> {
    session.scoped(run_devices(session, console)).await
}

async fn run_devices<A: PetcareApi, W: Write>(
    session: &Session<A>,
    console: &mut Console<W>,
) -> Result<()> {
    let entities = session
        .fetch_entities()
        .await
        .map_err(PetcareError::remote)?;

    if route(session, console, &entities.devices).await? == Routed::Emitted {
        return Ok(());
    }

    write!(
        console.out,
        "{}",
        devices::devices_table(&entities.devices, console.width)
    )?;
    Ok(())
}

/// `now` is the single reference time for every open trip in the report.
pub async fn report<A: PetcareApi, W: Write>(
    session: &Session<A>,
    console: &mut Console<W>,
    household_id: u64,
    pet_id: Option<u64>,
    now: DateTime<Utc>,
) -> Result<()> {
    session
        .scoped(run_report(session, console, household_id, pet_id, now))
        .await
}

async fn run_report<A: PetcareApi, W: Write>(
    session: &Session<A>,
    console: &mut Console<W>,
    household_id: u64,
    pet_id: Option<u64>,
    now: DateTime<Utc>,
) -> Result<()> {
    // device names are resolved against this snapshot only
    let entities = session
        .fetch_entities()
        .await
        .map_err(PetcareError::remote)?;
    let raw = session
        .fetch_report(household_id, pet_id)
        .await
        .map_err(PetcareError::remote)?;

    if route(session, console, &raw).await? == Routed::Emitted {
        return Ok(());
    }

    let payload = report::parse_report(raw)?;
    let rows = report::build_report(&payload, &entities, now);
    if rows.is_empty() {
        writeln!(console.out, "No movement recorded")?;
        return Ok(());
    }

    let columns = ReportRow::COLUMNS.map(Column::left);
    let cells: Vec<Vec<String>> = rows.iter().map(ReportRow::cells).collect();
    write!(console.out, "{}", render_table(&columns, &cells, console.width))?;
    Ok(())
}

pub async fn notifications<A: PetcareApi, W: Write>(
    session: &Session<A>,
    console: &mut Console<W>,
) -> Result<()> {
    session.scoped(run_notifications(session, console)).await
}

async fn run_notifications<A: PetcareApi, W: Write>(
    session: &Session<A>,
    console: &mut Console<W>,
) -> Result<()> {
    let Some(raw) = session
        .fetch_notifications()
        .await
        .map_err(PetcareError::remote)?
    else {
        info!("No notifications");
        return Ok(());
    };

    if route(session, console, &raw).await? == Routed::Emitted {
        return Ok(());
    }

    let payload = notification::parse_notifications(Some(raw))?;
    let table: NotificationTable = notification::build_notifications(&payload);
    if table.is_empty() {
        info!("No notifications");
        return Ok(());
    }

    let columns: Vec<Column> = table.columns.iter().map(|c| Column::left(c)).collect();
    let cells: Vec<Vec<String>> = table
        .rows
        .into_iter()
        .map(|row| row.into_iter().map(Option::unwrap_or_default).collect())
        .collect();
    write!(console.out, "{}", render_table(&columns, &cells, console.width))?;
    Ok(())
}

pub async fn lock<A: PetcareApi, W: Write>(
    session: &Session<A>,
    console: &mut Console<W>,
    device_id: u64,
    mode: LockMode,
) -> Result<ControlOutcome> {
    let outcome = session
        .scoped(control::set_mode(session.api(), device_id, mode))
        .await?;
    report_outcome(session, console, &outcome).await?;
    Ok(outcome)
}

pub async fn position<A: PetcareApi, W: Write>(
    session: &Session<A>,
    console: &mut Console<W>,
    pet_id: u64,
    location: PetLocation,
) -> Result<ControlOutcome> {
    let outcome = session
        .scoped(control::set_position(session.api(), pet_id, location))
        .await?;
    report_outcome(session, console, &outcome).await?;
    Ok(outcome)
}

async fn report_outcome<A: PetcareApi, W: Write>(
    session: &Session<A>,
    console: &mut Console<W>,
    outcome: &ControlOutcome,
) -> Result<()> {
    let payload = match outcome {
        ControlOutcome::Confirmed { name, state } => {
            json!({ "confirmed": true, "name": name, "state": state })
        }
        ControlOutcome::Ambiguous {
            name,
            state,
            reason,
        } => json!({ "confirmed": false, "name": name, "state": state, "reason": reason }),
    };
    if route(session, console, &payload).await? == Routed::Emitted {
        return Ok(());
    }

    let line = match outcome {
        ControlOutcome::Confirmed { .. } => green(&format!("✔ {} 🐾", outcome)),
        ControlOutcome::Ambiguous { .. } => yellow(&format!("⚠ {}", outcome)),
    };
    writeln!(console.out, "{}", line)?;
    Ok(())
}
