use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::require_text,
    error::{AppError, AppResult},
    models::Availability,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAvailabilityRequest {
    pub absence: String,
    pub start_time: DateTime<Utc>,
    pub finish_time: DateTime<Utc>,
}

impl CreateAvailabilityRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("absence", &self.absence, 200)?;
        check_window(self.start_time, self.finish_time)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateAvailabilityRequest {
    pub absence: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub finish_time: Option<DateTime<Utc>>,
}

impl UpdateAvailabilityRequest {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(absence) = &self.absence {
            require_text("absence", absence, 200)?;
        }
        Ok(())
    }
}

pub(crate) fn check_window(start: DateTime<Utc>, finish: DateTime<Utc>) -> AppResult<()> {
    if finish < start {
        return Err(AppError::BadRequest(
            "finish_time must not be before start_time".into(),
        ));
    }
    Ok(())
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct AvailabilityList {
    #[schema(value_type = Vec<Availability>)]
    pub items: Vec<Availability>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn window_must_not_be_inverted() {
        let start = Utc::now();
        assert!(check_window(start, start).is_ok());
        assert!(check_window(start, start + Duration::hours(8)).is_ok());
        assert!(check_window(start, start - Duration::minutes(1)).is_err());
    }
}
