use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Outcome category of a measurement.
///
/// Serialized as its integer code. A non-zero code describes a failed trial;
/// such records are valid data and stay in the log, but their costs carry no
/// meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant)]
pub enum MeasureErrorNo {
    #[display("NO_ERROR")]
    NoError,
    #[display("INSTANTIATION_ERROR")]
    InstantiationError,
    #[display("COMPILE_HOST")]
    CompileHostError,
    #[display("COMPILE_DEVICE")]
    CompileDeviceError,
    #[display("RUNTIME_DEVICE")]
    RuntimeDeviceError,
    #[display("WRONG_ANSWER")]
    WrongAnswer,
    #[display("BUILD_TIMEOUT")]
    BuildTimeout,
    #[display("RUN_TIMEOUT")]
    RunTimeout,
    #[display("UNKNOWN_ERROR")]
    UnknownError,
}

impl MeasureErrorNo {
    pub const ALL: [Self; 9] = [
        Self::NoError,
        Self::InstantiationError,
        Self::CompileHostError,
        Self::CompileDeviceError,
        Self::RuntimeDeviceError,
        Self::WrongAnswer,
        Self::BuildTimeout,
        Self::RunTimeout,
        Self::UnknownError,
    ];

    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::NoError => 0,
            Self::InstantiationError => 1,
            Self::CompileHostError => 2,
            Self::CompileDeviceError => 3,
            Self::RuntimeDeviceError => 4,
            Self::WrongAnswer => 5,
            Self::BuildTimeout => 6,
            Self::RunTimeout => 7,
            Self::UnknownError => 8,
        }
    }

    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }
}

impl Serialize for MeasureErrorNo {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for MeasureErrorNo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = u8::deserialize(deserializer)?;
        Self::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown measure error code: {code}")))
    }
}

/// Measured outcome of one trial.
///
/// Costs are per-repeat execution times in seconds. Non-finite values are
/// written as `null` by the JSON encoder and read back as NaN, so a record
/// with a broken measurement still round-trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureResult {
    #[serde(deserialize_with = "de_nullable_costs")]
    pub costs: Vec<f64>,
    pub error_no: MeasureErrorNo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
    /// Wall time of the whole measurement (build + run), in seconds.
    #[serde(deserialize_with = "de_nullable_f64")]
    pub all_cost: f64,
    /// Epoch seconds at which the measurement finished.
    #[serde(deserialize_with = "de_nullable_f64")]
    pub timestamp: f64,
}

impl MeasureResult {
    /// Creates a result stamped with the current time.
    #[must_use]
    pub fn new(
        costs: Vec<f64>,
        error_no: MeasureErrorNo,
        error_msg: Option<String>,
        all_cost: f64,
    ) -> Self {
        #[expect(clippy::cast_precision_loss)]
        let timestamp = Utc::now().timestamp_millis() as f64 / 1000.0;
        Self {
            costs,
            error_no,
            error_msg,
            all_cost,
            timestamp,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error_no.is_no_error()
    }

    /// Returns the arithmetic mean of `costs`, or `None` if there are none.
    ///
    /// The value is meaningful only for successful measurements.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean_cost(&self) -> Option<f64> {
        if self.costs.is_empty() {
            return None;
        }
        Some(self.costs.iter().sum::<f64>() / self.costs.len() as f64)
    }

    /// Returns the timestamp as a date, if it is representable.
    #[must_use]
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        if !self.timestamp.is_finite() {
            return None;
        }
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (secs, nanos) = {
            let secs = self.timestamp.floor();
            let nanos = ((self.timestamp - secs) * 1e9).round().min(999_999_999.0);
            (secs as i64, nanos as u32)
        };
        DateTime::from_timestamp(secs, nanos)
    }
}

fn de_nullable_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

fn de_nullable_costs<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let costs = Vec::<Option<f64>>::deserialize(deserializer)?;
    Ok(costs
        .into_iter()
        .map(|cost| cost.unwrap_or(f64::NAN))
        .collect())
}
