use uuid::Uuid;
use validator::ValidationError;

/// Video ids name files and directories under local storage, so only the
/// hyphenated UUID form is accepted.
pub fn is_video_id(id: &str) -> bool {
    id.len() == 36 && Uuid::try_parse(id).is_ok()
}

pub fn validate_video_id(id: &str) -> Result<(), ValidationError> {
    if is_video_id(id) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_video_id").with_message("Video id must be a UUID".into()))
    }
}
