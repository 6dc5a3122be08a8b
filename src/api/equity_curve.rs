use crate::api::AppState;
use crate::datasource::CsvDataSource;
use crate::domain::{Decimal, Instrument, PriceObservation, TimeMs, TradeFill};
use crate::error::{AppError, CurveError};
use crate::orchestration::{Replay, Session};
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

/// A timestamp given either as epoch milliseconds or as text.
///
/// Any other JSON value is held as-is so it fails as a malformed timestamp
/// instead of failing body extraction.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Text(String),
    Other(serde_json::Value),
}

impl RawTimestamp {
    fn resolve(raw: Option<&RawTimestamp>) -> Result<TimeMs, CurveError> {
        match raw {
            Some(RawTimestamp::Millis(ms)) => Ok(TimeMs::new(*ms)),
            Some(RawTimestamp::Text(s)) => TimeMs::parse(s),
            Some(RawTimestamp::Other(value)) => Err(CurveError::Ordering(format!(
                "malformed timestamp: {value}"
            ))),
            None => Err(CurveError::Ordering("missing timestamp".to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeFillDto {
    pub instrument_id: String,
    #[serde(default)]
    pub timestamp: Option<RawTimestamp>,
    pub side: String,
    pub size: Decimal,
    pub price: Decimal,
    #[serde(default)]
    pub commission: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceObservationDto {
    #[serde(default)]
    pub timestamp: Option<RawTimestamp>,
    pub price: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityCurveRequest {
    pub trades: Vec<TradeFillDto>,
    #[serde(default)]
    pub prices: Vec<PriceObservationDto>,
    pub base_capital: Option<Decimal>,
    pub from_ms: Option<i64>,
    pub to_ms: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvEquityCurveRequest {
    pub tradelog_csv: String,
    pub prices_csv: String,
    pub base_capital: Option<Decimal>,
    pub from_ms: Option<i64>,
    pub to_ms: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityCurveResponse {
    pub session_id: String,
    pub instrument: String,
    /// Entries in the whole run, before windowing.
    pub total_entries: usize,
    pub entries: Vec<LogEntryDto>,
    /// SHA-256 of the whole curve.
    pub digest: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntryDto {
    pub seq: usize,
    pub time_ms: i64,
    pub message: String,
    pub unrealized_pnl: String,
    pub realized_pnl: String,
    pub total_commission: String,
    pub equity: String,
    pub base_capital: String,
}

pub async fn post_equity_curve(
    State(state): State<AppState>,
    Json(body): Json<EquityCurveRequest>,
) -> Result<Json<EquityCurveResponse>, AppError> {
    let window = parse_window(body.from_ms, body.to_ms)?;

    let trades = body
        .trades
        .into_iter()
        .map(|dto| {
            TradeFill::new(
                Instrument::new(dto.instrument_id),
                RawTimestamp::resolve(dto.timestamp.as_ref())?,
                dto.side.parse()?,
                dto.size,
                dto.price,
                dto.commission.unwrap_or_default(),
            )
        })
        .collect::<Result<Vec<_>, CurveError>>()?;

    let prices = body
        .prices
        .into_iter()
        .map(|dto| {
            PriceObservation::new(RawTimestamp::resolve(dto.timestamp.as_ref())?, dto.price)
        })
        .collect::<Result<Vec<_>, CurveError>>()?;

    let base_capital = body
        .base_capital
        .unwrap_or(state.config.default_base_capital);
    let session = Session::new(trades, prices, base_capital);

    run(state, session, window).await
}

pub async fn post_equity_curve_csv(
    State(state): State<AppState>,
    Json(body): Json<CsvEquityCurveRequest>,
) -> Result<Json<EquityCurveResponse>, AppError> {
    let window = parse_window(body.from_ms, body.to_ms)?;
    let base_capital = body
        .base_capital
        .unwrap_or(state.config.default_base_capital);

    let source = CsvDataSource::from_text(body.tradelog_csv, body.prices_csv);
    let session = Session::from_source(&source, base_capital)?;

    run(state, session, window).await
}

type Window = (Option<TimeMs>, Option<TimeMs>);

fn parse_window(from_ms: Option<i64>, to_ms: Option<i64>) -> Result<Window, AppError> {
    let from_ms = from_ms.map(TimeMs::new);
    let to_ms = to_ms.map(TimeMs::new);
    if let (Some(from_ms), Some(to_ms)) = (from_ms, to_ms) {
        if from_ms > to_ms {
            return Err(AppError::BadRequest("fromMs must be <= toMs".into()));
        }
    }
    Ok((from_ms, to_ms))
}

async fn run(
    state: AppState,
    session: Session,
    (from_ms, to_ms): Window,
) -> Result<Json<EquityCurveResponse>, AppError> {
    let session_id = session.id;
    let player = state.player.clone();

    let replay = tokio::task::spawn_blocking(move || player.play(session))
        .await
        .map_err(|e| AppError::Internal(format!("Replay task failed: {}", e)))?
        .map_err(|e| {
            tracing::warn!(session = %session_id, error = %e, "Replay rejected");
            AppError::from(e)
        })?;

    let Replay {
        session_id,
        instrument,
        curve,
    } = replay;

    let entries = curve
        .window(from_ms, to_ms)
        .map(|(seq, e)| LogEntryDto {
            seq,
            time_ms: e.timestamp.as_i64(),
            message: e.message.to_string(),
            unrealized_pnl: e.unrealized_pnl.to_string(),
            realized_pnl: e.realized_pnl.to_string(),
            total_commission: e.total_commission.to_string(),
            equity: e.equity.to_string(),
            base_capital: e.base_capital.to_string(),
        })
        .collect();

    Ok(Json(EquityCurveResponse {
        session_id: session_id.to_string(),
        instrument: instrument.as_str().to_string(),
        total_entries: curve.len(),
        entries,
        digest: curve.digest(),
    }))
}
