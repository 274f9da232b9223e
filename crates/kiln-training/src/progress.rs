use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Metric snapshot reported by a trainer at the end of an epoch.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub loss: f64,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Started { job_id: String },
    Message { job_id: String, message: String },
    EpochCompleted { job_id: String, epoch: u32, total: u32, metrics: EpochMetrics },
    Finished { job_id: String },
}

/// Receives progress callbacks from a running trainer.
///
/// Sinks are awaited between epochs, so a sink that records into shared
/// state observes events strictly in emission order.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn on_event(&self, event: ProgressEvent);
}

#[derive(Debug, Default)]
pub struct StdoutProgressSink;

#[async_trait]
impl ProgressSink for StdoutProgressSink {
    async fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { job_id } => println!("[train:{job_id}] started"),
            ProgressEvent::Message { job_id, message } => println!("[train:{job_id}] {message}"),
            ProgressEvent::EpochCompleted { job_id, epoch, total, metrics } => {
                println!(
                    "[train:{job_id}] epoch {epoch}/{total} loss={:.4} acc={:.4}",
                    metrics.loss, metrics.accuracy
                );
            }
            ProgressEvent::Finished { job_id } => println!("[train:{job_id}] finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stdout_sink_accepts_every_event_kind() {
        let sink = StdoutProgressSink;
        let job_id = "job".to_string();
        sink.on_event(ProgressEvent::Started { job_id: job_id.clone() }).await;
        sink.on_event(ProgressEvent::EpochCompleted {
            job_id: job_id.clone(),
            epoch: 1,
            total: 2,
            metrics: EpochMetrics { loss: 0.5, accuracy: 0.9 },
        })
        .await;
        sink.on_event(ProgressEvent::Finished { job_id }).await;
    }

    #[test]
    fn test_events_serialize_with_type_tag() {
        let event = ProgressEvent::EpochCompleted {
            job_id: "m1".to_string(),
            epoch: 2,
            total: 3,
            metrics: EpochMetrics::default(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "epoch_completed");
        assert_eq!(json["epoch"], 2);
    }
}
