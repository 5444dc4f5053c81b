use std::fmt;

/// How the payload bytes should be interpreted.
///
/// Purely advisory: the codec carries the tag and never checks it against the
/// payload. Tags outside the known set survive a decode/encode cycle through
/// [`PayloadEncoding::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PayloadEncoding {
    #[default]
    Na,
    Json,
    Xml,
    Yaml,
    Csv,
    Toml,
    Ini,
    Protobuf,
    Other(u8),
}

impl PayloadEncoding {
    /// All known encodings, in tag order.
    pub const KNOWN: [PayloadEncoding; 8] = [
        PayloadEncoding::Na,
        PayloadEncoding::Json,
        PayloadEncoding::Xml,
        PayloadEncoding::Yaml,
        PayloadEncoding::Csv,
        PayloadEncoding::Toml,
        PayloadEncoding::Ini,
        PayloadEncoding::Protobuf,
    ];

    pub fn from_tag(tag: u8) -> Self {
        match tag {
            0 => PayloadEncoding::Na,
            1 => PayloadEncoding::Json,
            2 => PayloadEncoding::Xml,
            3 => PayloadEncoding::Yaml,
            4 => PayloadEncoding::Csv,
            5 => PayloadEncoding::Toml,
            6 => PayloadEncoding::Ini,
            7 => PayloadEncoding::Protobuf,
            other => PayloadEncoding::Other(other),
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            PayloadEncoding::Na => 0,
            PayloadEncoding::Json => 1,
            PayloadEncoding::Xml => 2,
            PayloadEncoding::Yaml => 3,
            PayloadEncoding::Csv => 4,
            PayloadEncoding::Toml => 5,
            PayloadEncoding::Ini => 6,
            PayloadEncoding::Protobuf => 7,
            PayloadEncoding::Other(tag) => tag,
        }
    }

    /// Lowercase name, or `"unknown"` for unrecognized tags.
    pub fn name(self) -> &'static str {
        match self {
            PayloadEncoding::Na => "na",
            PayloadEncoding::Json => "json",
            PayloadEncoding::Xml => "xml",
            PayloadEncoding::Yaml => "yaml",
            PayloadEncoding::Csv => "csv",
            PayloadEncoding::Toml => "toml",
            PayloadEncoding::Ini => "ini",
            PayloadEncoding::Protobuf => "protobuf",
            PayloadEncoding::Other(_) => "unknown",
        }
    }

    /// Parse a lowercase name as produced by [`PayloadEncoding::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::KNOWN
            .into_iter()
            .find(|encoding| encoding.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for PayloadEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadEncoding::Other(tag) => write!(f, "unknown({tag})"),
            known => f.write_str(known.name()),
        }
    }
}

impl From<u8> for PayloadEncoding {
    fn from(tag: u8) -> Self {
        Self::from_tag(tag)
    }
}

impl From<PayloadEncoding> for u8 {
    fn from(encoding: PayloadEncoding) -> Self {
        encoding.tag()
    }
}
