use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityPreset {
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub frame_rate: u32,
}

impl QualityPreset {
    /// Output subdirectory, e.g. `480p15`.
    pub fn dir_name(&self) -> String {
        format!("{}p{}", self.pixel_height, self.frame_rate)
    }
}

/// Rendering presets selectable with `-q`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Quality {
    #[default]
    #[value(name = "l")]
    Low,
    #[value(name = "m")]
    Medium,
    #[value(name = "h")]
    High,
    #[value(name = "p")]
    Production,
    #[value(name = "k")]
    FourK,
}

impl Quality {
    pub fn preset(self) -> QualityPreset {
        let (pixel_width, pixel_height, frame_rate) = match self {
            Quality::Low => (854, 480, 15),
            Quality::Medium => (1280, 720, 30),
            Quality::High => (1920, 1080, 60),
            Quality::Production => (2560, 1440, 60),
            Quality::FourK => (3840, 2160, 60),
        };
        QualityPreset {
            pixel_width,
            pixel_height,
            frame_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_and_directory_names() {
        assert_eq!(Quality::default(), Quality::Low);
        assert_eq!(Quality::Low.preset().dir_name(), "480p15");
        assert_eq!(Quality::Medium.preset().dir_name(), "720p30");
        assert_eq!(Quality::FourK.preset().dir_name(), "2160p60");
        assert_eq!(Quality::High.preset().pixel_width, 1920);
    }

    #[test]
    fn cli_letters_map_to_presets() {
        assert_eq!(Quality::from_str("p", false), Ok(Quality::Production));
        assert!(Quality::from_str("e", false).is_err());
    }
}
