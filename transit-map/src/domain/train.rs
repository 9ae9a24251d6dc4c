//! Derived train vocabulary: type, status, punctuality.

/// Train service type, from the feed's single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainType {
    Mainline,
    Suburban,
    Dart,
    Unknown,
}

impl TrainType {
    /// Map the raw `trainType` code. Anything outside {M, S, D} is Unknown.
    pub fn from_code(code: &str) -> Self {
        match code {
            "M" => TrainType::Mainline,
            "S" => TrainType::Suburban,
            "D" => TrainType::Dart,
            _ => TrainType::Unknown,
        }
    }

    /// Human-readable label for presentation.
    pub fn label(&self) -> &'static str {
        match self {
            TrainType::Mainline => "Mainline",
            TrainType::Suburban => "Suburban",
            TrainType::Dart => "DART",
            TrainType::Unknown => "Unknown",
        }
    }

    /// Lowercase key used in icon category tags.
    pub(crate) fn icon_key(&self) -> &'static str {
        match self {
            TrainType::Mainline => "mainline",
            TrainType::Suburban => "suburban",
            TrainType::Dart => "dart",
            TrainType::Unknown => "unknown",
        }
    }
}

/// Running status, from the feed's single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainStatus {
    Running,
    Terminated,
    NotYetRunning,
    Unknown,
}

impl TrainStatus {
    /// Map the raw `trainStatus` code. Anything outside {R, T, N} is Unknown.
    pub fn from_code(code: &str) -> Self {
        match code {
            "R" => TrainStatus::Running,
            "T" => TrainStatus::Terminated,
            "N" => TrainStatus::NotYetRunning,
            _ => TrainStatus::Unknown,
        }
    }

    /// Human-readable label for presentation.
    pub fn label(&self) -> &'static str {
        match self {
            TrainStatus::Running => "Running",
            TrainStatus::Terminated => "Terminated",
            TrainStatus::NotYetRunning => "Not yet running",
            TrainStatus::Unknown => "Unknown",
        }
    }
}

/// Lateness parsed from the free-text public message.
///
/// `Unknown` means the message carried no parseable lateness; it renders
/// as "N/A" and is excluded from numeric comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punctuality {
    /// Minutes ahead of schedule (positive magnitude).
    Early(i64),
    OnTime,
    /// Minutes behind schedule (positive magnitude).
    Late(i64),
    Unknown,
}

impl Punctuality {
    /// Parse the `(-N mins late)` fragment out of a train's public message.
    ///
    /// A negative value means early, zero means on time, positive means
    /// late. No match yields `Unknown`.
    pub fn from_public_message(message: &str) -> Self {
        let tokens: Vec<&str> = message.split_whitespace().collect();
        for window in tokens.windows(3) {
            let unit = window[1];
            if unit != "min" && unit != "mins" {
                continue;
            }
            // The fragment is usually parenthesized: "(3 mins late)".
            let qualifier = window[2].trim_end_matches(|c: char| !c.is_ascii_alphabetic());
            if qualifier != "late" {
                continue;
            }
            if let Ok(n) = window[0].trim_start_matches('(').parse::<i64>() {
                return match n {
                    n if n < 0 => Punctuality::Early(-n),
                    0 => Punctuality::OnTime,
                    n => Punctuality::Late(n),
                };
            }
        }
        Punctuality::Unknown
    }

    /// Signed minutes late: negative when early, `None` when unknown.
    pub fn minutes_late(&self) -> Option<i64> {
        match self {
            Punctuality::Early(n) => Some(-n),
            Punctuality::OnTime => Some(0),
            Punctuality::Late(n) => Some(*n),
            Punctuality::Unknown => None,
        }
    }

    /// Human-readable label for presentation.
    pub fn label(&self) -> String {
        match self {
            Punctuality::Early(1) => "1 min early".to_string(),
            Punctuality::Early(n) => format!("{n} mins early"),
            Punctuality::OnTime => "On time".to_string(),
            Punctuality::Late(1) => "1 min late".to_string(),
            Punctuality::Late(n) => format!("{n} mins late"),
            Punctuality::Unknown => "N/A".to_string(),
        }
    }
}

/// Icon bucket for trains: running status dominates lateness.
///
/// A late but terminated (or not-yet-running) train buckets as NotRunning,
/// as does a running train whose lateness could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunctualityBucket {
    /// Covers both on-time and early.
    OnTime,
    Late,
    NotRunning,
}

impl PunctualityBucket {
    pub fn derive(status: TrainStatus, punctuality: Punctuality) -> Self {
        match (status, punctuality) {
            (TrainStatus::Running, Punctuality::Early(_) | Punctuality::OnTime) => {
                PunctualityBucket::OnTime
            }
            (TrainStatus::Running, Punctuality::Late(_)) => PunctualityBucket::Late,
            _ => PunctualityBucket::NotRunning,
        }
    }

    /// Key fragment used in icon category tags.
    pub(crate) fn icon_key(&self) -> &'static str {
        match self {
            PunctualityBucket::OnTime => "OnTime",
            PunctualityBucket::Late => "Late",
            PunctualityBucket::NotRunning => "NotRunning",
        }
    }
}
