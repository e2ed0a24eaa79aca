use std::{fmt, str::FromStr};

/// An output container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFormat {
    Woff2,
    Woff,
    Ttf,
    Otf,
}

impl FontFormat {
    /// Every format, in export order.
    pub const ALL: [FontFormat; 4] =
        [FontFormat::Woff2, FontFormat::Woff, FontFormat::Ttf, FontFormat::Otf];

    pub fn extension(self) -> &'static str {
        match self {
            FontFormat::Woff2 => "woff2",
            FontFormat::Woff => "woff",
            FontFormat::Ttf => "ttf",
            FontFormat::Otf => "otf",
        }
    }
}

impl fmt::Display for FontFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_uppercase())
    }
}

impl FromStr for FontFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "woff2" => Ok(FontFormat::Woff2),
            "woff" => Ok(FontFormat::Woff),
            "ttf" | "truetype" => Ok(FontFormat::Ttf),
            "otf" | "opentype" => Ok(FontFormat::Otf),
            other => Err(format!("unknown font format '{other}' (expected woff2, woff, ttf or otf)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("WOFF2".parse::<FontFormat>(), Ok(FontFormat::Woff2));
        assert_eq!("truetype".parse::<FontFormat>(), Ok(FontFormat::Ttf));
        assert!("eot".parse::<FontFormat>().is_err());
    }

    #[test]
    fn test_export_order() {
        let extensions: Vec<_> = FontFormat::ALL.iter().map(|f| f.extension()).collect();
        assert_eq!(extensions, ["woff2", "woff", "ttf", "otf"]);
    }
}
