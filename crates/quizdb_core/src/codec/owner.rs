//! Owner profile records.

use super::fields::{ProfileField, USE_AUTO_NEXT, USE_BUTTONS};
use super::reader::Reader;
use super::{DecodeError, DecodeResult};
use crate::model::{OwnerProfile, Preferences};
use quizdb_codec::{CodecResult, Scalar, TokenWriter};

/// Decodes an owner profile.
///
/// # Errors
///
/// Fails on malformed text, on scalars where the profile, preferences
/// or tag map must be, and when the owner id is missing.
pub fn decode_profile(text: &str) -> DecodeResult<OwnerProfile> {
    let mut reader = Reader::new(text);
    reader.begin_object("profile")?;
    let mut id = None;
    let mut profile = OwnerProfile::default();
    while let Some(name) = reader.next_field()? {
        match ProfileField::lookup(&name) {
            Some(ProfileField::OwnerId) => id = reader.read_text()?,
            Some(ProfileField::PreferredPrefix) => profile.preferred_prefix = reader.read_text()?,
            Some(ProfileField::Preferences) => profile.preferences = read_preferences(&mut reader)?,
            Some(ProfileField::Tags) => profile.tags = reader.read_tags(&name)?,
            None => reader.skip()?,
        }
    }
    reader.finish()?;
    profile.id = id.ok_or(DecodeError::MissingField {
        record: "profile",
        field: ProfileField::OwnerId.canonical(),
    })?;
    Ok(profile)
}

fn read_preferences(reader: &mut Reader<'_>) -> DecodeResult<Preferences> {
    reader.begin_object("preferences")?;
    let mut preferences = Preferences::default();
    while let Some(name) = reader.next_field()? {
        match name.as_str() {
            USE_BUTTONS => preferences.use_buttons = reader.read_bool()?.unwrap_or(false),
            USE_AUTO_NEXT => preferences.use_auto_next = reader.read_bool()?.unwrap_or(false),
            _ => reader.skip()?,
        }
    }
    Ok(preferences)
}

/// Encodes an owner profile with canonical field names.
///
/// # Errors
///
/// Fails only on a writer misuse, which would be a bug here.
pub fn encode_profile(profile: &OwnerProfile, pretty: bool) -> CodecResult<String> {
    let mut writer = TokenWriter::new(pretty);
    writer.begin_object()?;
    writer.member(ProfileField::OwnerId.canonical(), profile.id.as_str())?;
    writer.member(
        ProfileField::PreferredPrefix.canonical(),
        Scalar::from(profile.preferred_prefix.as_deref()),
    )?;
    writer.field(ProfileField::Preferences.canonical())?;
    writer.begin_object()?;
    writer.member(USE_BUTTONS, profile.preferences.use_buttons)?;
    writer.member(USE_AUTO_NEXT, profile.preferences.use_auto_next)?;
    writer.end_object()?;
    writer.field(ProfileField::Tags.canonical())?;
    writer.begin_object()?;
    for (tag, glyph) in &profile.tags {
        writer.member(tag, glyph.as_str())?;
    }
    writer.end_object()?;
    writer.end_object()?;
    writer.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let mut profile = OwnerProfile::new("u1");
        profile.preferred_prefix = Some("!".into());
        profile.preferences.use_buttons = true;
        profile.tags.insert("science".into(), "🧪".into());

        let text = encode_profile(&profile, true).unwrap();
        assert_eq!(decode_profile(&text).unwrap(), profile);
    }

    #[test]
    fn aliases() {
        let profile = decode_profile(
            r#"{"USERID":"u9","prefix":"null","preferences":{"useAutoNext":true},"tags":["a"]}"#,
        )
        .unwrap();
        assert_eq!(profile.id, "u9");
        assert_eq!(profile.preferred_prefix, None);
        assert!(profile.preferences.use_auto_next);
        assert!(!profile.preferences.use_buttons);
        assert!(profile.tags.contains_key("a"));
    }

    #[test]
    fn missing_id() {
        assert!(matches!(
            decode_profile("{}"),
            Err(DecodeError::MissingField { record: "profile", .. })
        ));
    }
}
