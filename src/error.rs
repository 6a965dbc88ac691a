use std::error::Error as StdError;
use std::fmt::Result as FmtResult;
use std::fmt::{Display, Formatter};
use std::result::Result as StdResult;

type Source = Option<Box<dyn StdError + Send + Sync + 'static>>;

/// Possible errors that can occur while converting point clouds and images into E57 files.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// The LAS/LAZ point cloud input could not be opened or decoded.
    SourceRead { desc: String, source: Source },
    /// The output archive could not be created, for example because the path is not writable.
    ArchiveCreate { desc: String, source: Source },
    /// An operation was called in the wrong life cycle state of the archive,
    /// for example adding an image after the file was closed.
    ArchiveState { desc: String, source: Source },
    /// An image file could not be read or decoded.
    ImageLoad { desc: String, source: Source },
    /// An image could not be encoded as JPEG or the encoded payload was empty.
    ImageEncode { desc: String, source: Source },
    /// The image manifest is not valid JSON, misses required keys or contains unusable values.
    ManifestParse { desc: String, source: Source },
    /// Something went wrong while writing data into the output archive.
    /// Typically this is caused by an IO error of the underlying writer.
    Write { desc: String, source: Source },
    /// The supplied data cannot be represented in a valid E57 file.
    Invalid { desc: String, source: Source },
    /// An unexpected internal issue occurred.
    /// Most likely this is a logic error inside the library.
    Internal { desc: String, source: Source },
}

impl Error {
    /// Creates an invalid data error from text.
    pub fn invalid<T, C: Display>(desc: C) -> Result<T> {
        Err(Error::Invalid {
            desc: desc.to_string(),
            source: None,
        })
    }

    /// Creates an archive life cycle error from text.
    pub fn state<T, C: Display>(desc: C) -> Result<T> {
        Err(Error::ArchiveState {
            desc: desc.to_string(),
            source: None,
        })
    }

    /// Creates an internal error from text.
    pub fn internal<T, C: Display>(desc: C) -> Result<T> {
        Err(Error::Internal {
            desc: desc.to_string(),
            source: None,
        })
    }

    /// Creates an image encoding error from text.
    pub fn encode<T, C: Display>(desc: C) -> Result<T> {
        Err(Error::ImageEncode {
            desc: desc.to_string(),
            source: None,
        })
    }

    /// Creates a manifest error from text.
    pub fn manifest<T, C: Display>(desc: C) -> Result<T> {
        Err(Error::ManifestParse {
            desc: desc.to_string(),
            source: None,
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Error::SourceRead { desc, .. } => write!(f, "Failed to read point cloud: {desc}"),
            Error::ArchiveCreate { desc, .. } => write!(f, "Failed to create E57 file: {desc}"),
            Error::ArchiveState { desc, .. } => write!(f, "Invalid E57 writer state: {desc}"),
            Error::ImageLoad { desc, .. } => write!(f, "Failed to load image: {desc}"),
            Error::ImageEncode { desc, .. } => write!(f, "Failed to encode image: {desc}"),
            Error::ManifestParse { desc, .. } => write!(f, "Invalid image manifest: {desc}"),
            Error::Write { desc, .. } => write!(f, "Failed to write E57: {desc}"),
            Error::Invalid { desc, .. } => write!(f, "Invalid E57 content: {desc}"),
            Error::Internal { desc, .. } => write!(f, "Internal error: {desc}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        let source = match self {
            Error::SourceRead { source, .. } => source,
            Error::ArchiveCreate { source, .. } => source,
            Error::ArchiveState { source, .. } => source,
            Error::ImageLoad { source, .. } => source,
            Error::ImageEncode { source, .. } => source,
            Error::ManifestParse { source, .. } => source,
            Error::Write { source, .. } => source,
            Error::Invalid { source, .. } => source,
            Error::Internal { source, .. } => source,
        };
        source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn StdError + 'static))
    }
}

/// Result type used by all fallible operations of this crate.
pub type Result<T> = StdResult<T, Error>;

/// Helper trait to attach a description and an error category to foreign results and options.
pub(crate) trait Converter<T> {
    fn source_err<C: Display>(self, desc: C) -> Result<T>;
    fn create_err<C: Display>(self, desc: C) -> Result<T>;
    fn load_err<C: Display>(self, desc: C) -> Result<T>;
    fn encode_err<C: Display>(self, desc: C) -> Result<T>;
    fn manifest_err<C: Display>(self, desc: C) -> Result<T>;
    fn write_err<C: Display>(self, desc: C) -> Result<T>;
    fn invalid_err<C: Display>(self, desc: C) -> Result<T>;
    fn internal_err<C: Display>(self, desc: C) -> Result<T>;
}

impl<T, E> Converter<T> for StdResult<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn source_err<C: Display>(self, desc: C) -> Result<T> {
        self.map_err(|e| Error::SourceRead {
            desc: desc.to_string(),
            source: Some(Box::new(e)),
        })
    }

    fn create_err<C: Display>(self, desc: C) -> Result<T> {
        self.map_err(|e| Error::ArchiveCreate {
            desc: desc.to_string(),
            source: Some(Box::new(e)),
        })
    }

    fn load_err<C: Display>(self, desc: C) -> Result<T> {
        self.map_err(|e| Error::ImageLoad {
            desc: desc.to_string(),
            source: Some(Box::new(e)),
        })
    }

    fn encode_err<C: Display>(self, desc: C) -> Result<T> {
        self.map_err(|e| Error::ImageEncode {
            desc: desc.to_string(),
            source: Some(Box::new(e)),
        })
    }

    fn manifest_err<C: Display>(self, desc: C) -> Result<T> {
        self.map_err(|e| Error::ManifestParse {
            desc: desc.to_string(),
            source: Some(Box::new(e)),
        })
    }

    fn write_err<C: Display>(self, desc: C) -> Result<T> {
        self.map_err(|e| Error::Write {
            desc: desc.to_string(),
            source: Some(Box::new(e)),
        })
    }

    fn invalid_err<C: Display>(self, desc: C) -> Result<T> {
        self.map_err(|e| Error::Invalid {
            desc: desc.to_string(),
            source: Some(Box::new(e)),
        })
    }

    fn internal_err<C: Display>(self, desc: C) -> Result<T> {
        self.map_err(|e| Error::Internal {
            desc: desc.to_string(),
            source: Some(Box::new(e)),
        })
    }
}

impl<T> Converter<T> for Option<T> {
    fn source_err<C: Display>(self, desc: C) -> Result<T> {
        self.ok_or_else(|| Error::SourceRead {
            desc: desc.to_string(),
            source: None,
        })
    }

    fn create_err<C: Display>(self, desc: C) -> Result<T> {
        self.ok_or_else(|| Error::ArchiveCreate {
            desc: desc.to_string(),
            source: None,
        })
    }

    fn load_err<C: Display>(self, desc: C) -> Result<T> {
        self.ok_or_else(|| Error::ImageLoad {
            desc: desc.to_string(),
            source: None,
        })
    }

    fn encode_err<C: Display>(self, desc: C) -> Result<T> {
        self.ok_or_else(|| Error::ImageEncode {
            desc: desc.to_string(),
            source: None,
        })
    }

    fn manifest_err<C: Display>(self, desc: C) -> Result<T> {
        self.ok_or_else(|| Error::ManifestParse {
            desc: desc.to_string(),
            source: None,
        })
    }

    fn write_err<C: Display>(self, desc: C) -> Result<T> {
        self.ok_or_else(|| Error::Write {
            desc: desc.to_string(),
            source: None,
        })
    }

    fn invalid_err<C: Display>(self, desc: C) -> Result<T> {
        self.ok_or_else(|| Error::Invalid {
            desc: desc.to_string(),
            source: None,
        })
    }

    fn internal_err<C: Display>(self, desc: C) -> Result<T> {
        self.ok_or_else(|| Error::Internal {
            desc: desc.to_string(),
            source: None,
        })
    }
}
