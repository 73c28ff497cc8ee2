use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use chrono::{DateTime, Utc};
use serde_json::json;
use shared::models::{ShipmentStatus, tables};
use shared::notify::{NotifyStatusRequest, NotifyStatusResponse};
use shared::{ApiResponse, AppError, AppResult, ErrorCode};
use validator::Validate;
use wasel_client::store::Query;

use crate::core::ServerState;
use crate::sender::OutgoingMessage;

/// Audit line appended to the shipment's `notes` column
pub fn audit_note(at: DateTime<Utc>, status: &ShipmentStatus, phone: &str) -> String {
    format!(
        "[{}] notify-status: {} ({}) sent to {}",
        at.format("%Y-%m-%d %H:%M:%S UTC"),
        status.as_str(),
        status.label(),
        phone
    )
}

fn append_note(existing: Option<&str>, line: &str) -> String {
    match existing {
        Some(notes) if !notes.trim().is_empty() => format!("{notes}\n{line}"),
        _ => line.to_string(),
    }
}

/// POST /functions/v1/notify-status
pub async fn notify_status(
    State(state): State<ServerState>,
    payload: Result<Json<NotifyStatusRequest>, JsonRejection>,
) -> AppResult<ApiResponse<NotifyStatusResponse>> {
    let Json(req) = payload.map_err(|e| AppError::invalid_request(e.body_text()))?;

    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    if !req.phone_is_well_formed() {
        return Err(AppError::validation("recipient_phone is invalid")
            .with_detail("recipient_phone", req.recipient_phone.clone()));
    }

    let message = crate::templates::render(&req.new_status, &req.recipient_name, &req.tracking_number)
        .ok_or_else(|| {
            AppError::new(ErrorCode::NotificationTemplateMissing)
                .with_detail("status", req.new_status.as_str())
        })?;

    // 1. 审计备注 (失败即终止)
    write_audit_note(&state, &req).await?;

    // 2. 发送短信 (失败不影响响应)
    let outgoing = OutgoingMessage {
        to: req.recipient_phone.clone(),
        recipient_name: req.recipient_name.clone(),
        body: message.clone(),
    };
    let notification_sent = match state.sender.send(&outgoing).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                shipment_id = %req.shipment_id,
                carrier = state.sender.name(),
                error = %e,
                "Status message not sent"
            );
            false
        }
    };

    tracing::info!(
        shipment_id = %req.shipment_id,
        status = %req.new_status,
        notification_sent,
        "Shipment status notification processed"
    );

    Ok(ApiResponse::success(NotifyStatusResponse {
        success: true,
        shipment_id: req.shipment_id,
        message,
        notification_sent,
    }))
}

async fn write_audit_note(state: &ServerState, req: &NotifyStatusRequest) -> AppResult<()> {
    let query = Query::new().eq("id", req.shipment_id.as_str());

    let row = state
        .store
        .select_one(tables::SHIPMENTS, &query)
        .await
        .map_err(|e| {
            tracing::error!(shipment_id = %req.shipment_id, error = %e, "Shipment lookup failed");
            AppError::database(e.to_string())
        })?
        .ok_or_else(|| AppError::row_missing(ErrorCode::ShipmentNotFound, req.shipment_id.as_str()))?;

    let line = audit_note(Utc::now(), &req.new_status, &req.recipient_phone);
    let notes = append_note(row.get("notes").and_then(|v| v.as_str()), &line);

    state
        .store
        .update(tables::SHIPMENTS, &query, json!({ "notes": notes }))
        .await
        .map_err(|e| {
            tracing::error!(shipment_id = %req.shipment_id, error = %e, "Audit note update failed");
            AppError::database(e.to_string())
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_audit_note_format() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap();
        let note = audit_note(at, &ShipmentStatus::Delivered, "07700000000");
        assert_eq!(
            note,
            "[2024-05-01 10:30:00 UTC] notify-status: delivered (تم التسليم) sent to 07700000000"
        );
    }

    #[test]
    fn test_append_note() {
        assert_eq!(append_note(None, "b"), "b");
        assert_eq!(append_note(Some("  "), "b"), "b");
        assert_eq!(append_note(Some("a"), "b"), "a\nb");
    }
}
