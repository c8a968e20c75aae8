//! Field names and their accepted aliases.
//!
//! Every record type has one table mapping the names found in input to
//! a field, and one canonical name used when writing. Matching is
//! case-sensitive.

/// Fields of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentField {
    /// `ownerId`, `userId`, `USERID`
    OwnerId,
    /// `name`, `listName`
    Name,
    /// `id`, `listid`, `listId`
    Id,
    /// `createdAtMillis`, `createdAt`, `creationDate`
    CreatedAt,
    /// `theme`, `category`
    Theme,
    /// `tagEmojiByTagName`, `tags`
    Tags,
    /// `questions`
    Questions,
}

impl DocumentField {
    /// Resolves an input field name.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "ownerId" | "userId" | "USERID" => Self::OwnerId,
            "name" | "listName" => Self::Name,
            "id" | "listid" | "listId" => Self::Id,
            "createdAtMillis" | "createdAt" | "creationDate" => Self::CreatedAt,
            "theme" | "category" => Self::Theme,
            "tagEmojiByTagName" | "tags" => Self::Tags,
            "questions" => Self::Questions,
            _ => return None,
        })
    }

    /// Name written on encode.
    #[must_use]
    pub const fn canonical(self) -> &'static str {
        match self {
            Self::OwnerId => "ownerId",
            Self::Name => "name",
            Self::Id => "id",
            Self::CreatedAt => "createdAtMillis",
            Self::Theme => "theme",
            Self::Tags => "tagEmojiByTagName",
            Self::Questions => "questions",
        }
    }
}

/// Fields of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionField {
    /// `question`, `text`
    Text,
    /// `explication`, `explanation`
    Explanation,
    /// `imageSrc`, `image`, `imageRef`
    ImageRef,
    /// `options`, `answers`
    Options,
}

impl QuestionField {
    /// Resolves an input field name.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "question" | "text" => Self::Text,
            "explication" | "explanation" => Self::Explanation,
            "imageSrc" | "image" | "imageRef" => Self::ImageRef,
            "options" | "answers" => Self::Options,
            _ => return None,
        })
    }

    /// Name written on encode.
    #[must_use]
    pub const fn canonical(self) -> &'static str {
        match self {
            Self::Text => "question",
            Self::Explanation => "explication",
            Self::ImageRef => "imageSrc",
            Self::Options => "options",
        }
    }
}

/// Fields of an answer option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionField {
    /// `text`, `option`
    Text,
    /// `isCorrect`, `correct`
    IsCorrect,
    /// `explication`, `explanation`
    Explanation,
}

impl OptionField {
    /// Resolves an input field name.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "text" | "option" => Self::Text,
            "isCorrect" | "correct" => Self::IsCorrect,
            "explication" | "explanation" => Self::Explanation,
            _ => return None,
        })
    }

    /// Name written on encode.
    #[must_use]
    pub const fn canonical(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::IsCorrect => "isCorrect",
            Self::Explanation => "explication",
        }
    }
}

/// Fields of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptField {
    /// `ownerId`, `userId`, `USERID`
    OwnerId,
    /// `documentId`, `listId`, `listid`
    DocumentId,
    /// `startedAtMillis`, `start`
    StartedAt,
    /// `endedAtMillis`, `end`
    EndedAt,
    /// `answers`
    Answers,
}

impl AttemptField {
    /// Resolves an input field name.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "ownerId" | "userId" | "USERID" => Self::OwnerId,
            "documentId" | "listId" | "listid" => Self::DocumentId,
            "startedAtMillis" | "start" => Self::StartedAt,
            "endedAtMillis" | "end" => Self::EndedAt,
            "answers" => Self::Answers,
            _ => return None,
        })
    }

    /// Name written on encode.
    #[must_use]
    pub const fn canonical(self) -> &'static str {
        match self {
            Self::OwnerId => "ownerId",
            Self::DocumentId => "documentId",
            Self::StartedAt => "startedAtMillis",
            Self::EndedAt => "endedAtMillis",
            Self::Answers => "answers",
        }
    }
}

/// Fields of one answer inside an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerField {
    /// `index`
    Index,
    /// `durationMillis`, `duration`
    Duration,
    /// `chosen`, `options`
    Chosen,
}

impl AnswerField {
    /// Resolves an input field name.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "index" => Self::Index,
            "durationMillis" | "duration" => Self::Duration,
            "chosen" | "options" => Self::Chosen,
            _ => return None,
        })
    }

    /// Name written on encode.
    #[must_use]
    pub const fn canonical(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Duration => "durationMillis",
            Self::Chosen => "chosen",
        }
    }
}

/// Fields of an owner profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    /// `ownerId`, `id`, `userId`, `USERID`
    OwnerId,
    /// `preferredPrefix`, `prefix`
    PreferredPrefix,
    /// `preferences`
    Preferences,
    /// `tagEmojiByTagName`, `tags`
    Tags,
}

impl ProfileField {
    /// Resolves an input field name.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "ownerId" | "id" | "userId" | "USERID" => Self::OwnerId,
            "preferredPrefix" | "prefix" => Self::PreferredPrefix,
            "preferences" => Self::Preferences,
            "tagEmojiByTagName" | "tags" => Self::Tags,
            _ => return None,
        })
    }

    /// Name written on encode.
    #[must_use]
    pub const fn canonical(self) -> &'static str {
        match self {
            Self::OwnerId => "ownerId",
            Self::PreferredPrefix => "preferredPrefix",
            Self::Preferences => "preferences",
            Self::Tags => "tagEmojiByTagName",
        }
    }
}

/// Preference flag names.
pub const USE_BUTTONS: &str = "useButtons";
/// Preference flag names.
pub const USE_AUTO_NEXT: &str = "useAutoNext";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_aliases() {
        for name in ["ownerId", "userId", "USERID"] {
            assert_eq!(DocumentField::lookup(name), Some(DocumentField::OwnerId));
        }
        for name in ["id", "listid", "listId"] {
            assert_eq!(DocumentField::lookup(name), Some(DocumentField::Id));
        }
        assert_eq!(DocumentField::lookup("userid"), None);
        assert_eq!(DocumentField::lookup("unknown"), None);
    }

    #[test]
    fn option_aliases() {
        assert_eq!(OptionField::lookup("correct"), Some(OptionField::IsCorrect));
        assert_eq!(OptionField::lookup("isCorrect"), Some(OptionField::IsCorrect));
        assert_eq!(OptionField::IsCorrect.canonical(), "isCorrect");
    }

    #[test]
    fn canonical_names_resolve_to_themselves() {
        for field in [
            DocumentField::OwnerId,
            DocumentField::Name,
            DocumentField::Id,
            DocumentField::CreatedAt,
            DocumentField::Theme,
            DocumentField::Tags,
            DocumentField::Questions,
        ] {
            assert_eq!(DocumentField::lookup(field.canonical()), Some(field));
        }
        for field in [
            QuestionField::Text,
            QuestionField::Explanation,
            QuestionField::ImageRef,
            QuestionField::Options,
        ] {
            assert_eq!(QuestionField::lookup(field.canonical()), Some(field));
        }
    }
}
