use serde::{Deserialize, Serialize};

/// Semantic group of an operation-status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Normal,
    Fault,
    /// Short stops and changeovers.
    Delay,
    ScheduledStop,
    Waiting,
    QualityCheck,
    Improvement,
    Admin,
    UnknownLoss,
    SignalLoss,
    Unknown,
}

impl StatusCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCategory::Normal => "normal",
            StatusCategory::Fault => "fault",
            StatusCategory::Delay => "delay",
            StatusCategory::ScheduledStop => "scheduled_stop",
            StatusCategory::Waiting => "waiting",
            StatusCategory::QualityCheck => "quality_check",
            StatusCategory::Improvement => "improvement",
            StatusCategory::Admin => "admin",
            StatusCategory::UnknownLoss => "unknown_loss",
            StatusCategory::SignalLoss => "signal_loss",
            StatusCategory::Unknown => "unknown",
        }
    }

    pub fn is_productive(&self) -> bool {
        matches!(self, StatusCategory::Normal)
    }
}

const CATEGORY_TABLE: &[(StatusCategory, &[&str])] = &[
    (
        StatusCategory::Normal,
        &["normal operation", "pemanasan", "tenken", "production"],
    ),
    (
        StatusCategory::Fault,
        &[
            "trouble machine",
            "machine off",
            "repair",
            "not connected",
            "shutdown",
            "maintenance",
        ],
    ),
    (
        StatusCategory::Delay,
        &[
            "chokotei",
            "dandori",
            "tool changes",
            "ganti toishi",
            "ganti dresser",
            "dressing profile",
            "dress-2",
        ],
    ),
    (
        StatusCategory::ScheduledStop,
        &[
            "stop planning",
            "jam istirahat",
            "rencana perbaikan",
            "plan proses selesai",
            "meeting pagi/sore",
        ],
    ),
    (
        StatusCategory::Waiting,
        &[
            "waiting material",
            "antri job",
            "menunggu intruksi atasan",
            "idle time",
        ],
    ),
    (
        StatusCategory::QualityCheck,
        &["cek qc", "check hagata", "1 tooth", "quality check"],
    ),
    (StatusCategory::Improvement, &["5s", "kaizen", "trial"]),
    (
        StatusCategory::Admin,
        &["input data", "buang kiriko", "control loss time"],
    ),
    (StatusCategory::UnknownLoss, &["unknown loss time"]),
    (StatusCategory::SignalLoss, &["signal loss"]),
];

/// Case-insensitive exact lookup; anything unlisted is `Unknown`.
pub fn classify(label: &str) -> StatusCategory {
    let label = label.trim();
    CATEGORY_TABLE
        .iter()
        .find(|(_, labels)| labels.iter().any(|known| known.eq_ignore_ascii_case(label)))
        .map(|(category, _)| *category)
        .unwrap_or(StatusCategory::Unknown)
}

/// Two labels describe the same status.
pub fn same_status(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
