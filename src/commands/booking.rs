//! Booking commands: list, book, edit, cancel.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use mrbs_core::config::AppConfig;
use mrbs_core::error::AppError;
use mrbs_core::types::time::{format_datetime, parse_date};
use mrbs_core::types::{BookingId, RoomId};
use mrbs_service::BookingRequest;

use super::Engine;
use crate::output::{self, OutputFormat};

/// Arguments for `list`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Operating day, `YYYY-MM-DD` (defaults to today)
    #[arg(short, long)]
    pub date: Option<String>,
}

/// Booking fields shared by `book` and `edit`
#[derive(Debug, Args)]
pub struct BookingFields {
    /// Acting user's login name
    #[arg(long = "as", value_name = "USER")]
    pub user: String,
    /// Room ID
    #[arg(short, long)]
    pub room: i32,
    /// Local start time, `YYYY-MM-DD HH:MM`
    #[arg(short, long)]
    pub start: String,
    /// Length in 30-minute slots
    #[arg(long, default_value_t = 2)]
    pub slots: u32,
    /// Title
    #[arg(short, long)]
    pub title: String,
    /// Description
    #[arg(short, long)]
    pub description: Option<String>,
}

impl BookingFields {
    fn to_request(&self) -> BookingRequest {
        BookingRequest {
            room_id: RoomId(self.room),
            start_time: self.start.clone(),
            duration_slots: self.slots,
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }
}

/// Arguments for `book`
#[derive(Debug, Args)]
pub struct BookArgs {
    /// Booking fields
    #[command(flatten)]
    pub fields: BookingFields,
}

/// Arguments for `edit`
#[derive(Debug, Args)]
pub struct EditArgs {
    /// Booking ID
    pub id: BookingId,
    /// New booking fields
    #[command(flatten)]
    pub fields: BookingFields,
}

/// Arguments for `cancel`
#[derive(Debug, Args)]
pub struct CancelArgs {
    /// Booking ID
    pub id: BookingId,
    /// Acting user's login name
    #[arg(long = "as", value_name = "USER")]
    pub user: String,
}

/// Listing display row for table output
#[derive(Debug, Serialize, Tabled)]
struct BookingRow {
    /// Booking ID
    id: String,
    /// Room
    room: String,
    /// Start (local)
    start: String,
    /// End (local)
    end: String,
    /// Title
    title: String,
    /// Booked by
    booked_by: String,
}

/// List bookings for a day.
pub async fn list(args: &ListArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let date = args.date.as_deref().map(parse_date).transpose()?;
    let engine = Engine::open(config).await?;
    let result = engine.service().list(date).await;
    let offset = engine.service().policy().offset();
    engine.close().await;
    let rows = result?;

    match format {
        OutputFormat::Json => output::print_json(&rows),
        OutputFormat::Table => {
            let rows: Vec<BookingRow> = rows
                .iter()
                .map(|r| {
                    let b = &r.listing.booking;
                    BookingRow {
                        id: b.id.to_string(),
                        room: r.room_name.clone(),
                        start: format_datetime(b.start_time, offset),
                        end: format_datetime(b.end_time, offset),
                        title: b.title.clone(),
                        booked_by: r.listing.booked_by.clone(),
                    }
                })
                .collect();
            output::print_list(&rows, format);
        }
    }
    Ok(())
}

/// Book a room.
pub async fn book(args: &BookArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let engine = Engine::open(config).await?;
    let result = async {
        let ctx = engine.act_as(&args.fields.user).await?;
        engine.service().create(&ctx, args.fields.to_request()).await
    }
    .await;
    let offset = engine.service().policy().offset();
    engine.close().await;

    let view = result?;
    output::print_outcome(&view, &view.summary(offset), format);
    if format == OutputFormat::Table {
        output::print_kv("Booking ID", &view.booking.id.to_string());
    }
    Ok(())
}

/// Change a booking.
pub async fn edit(args: &EditArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let engine = Engine::open(config).await?;
    let result = async {
        let ctx = engine.act_as(&args.fields.user).await?;
        engine
            .service()
            .edit(&ctx, args.id, args.fields.to_request())
            .await
    }
    .await;
    let offset = engine.service().policy().offset();
    engine.close().await;

    let view = result?;
    output::print_outcome(&view, &view.summary(offset), format);
    Ok(())
}

/// Delete a booking.
pub async fn cancel(args: &CancelArgs, config: &AppConfig) -> Result<(), AppError> {
    let engine = Engine::open(config).await?;
    let result = async {
        let ctx = engine.act_as(&args.user).await?;
        engine.service().delete(&ctx, args.id).await
    }
    .await;
    engine.close().await;

    result?;
    output::print_success(&format!("Booking {} cancelled", args.id));
    Ok(())
}
