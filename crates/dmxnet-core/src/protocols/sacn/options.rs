use super::layout;

/// Framing-layer option flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SacnOptions {
    pub preview: bool,
    pub stream_terminated: bool,
    pub force_sync: bool,
}

impl SacnOptions {
    pub const fn from_byte(value: u8) -> Self {
        Self {
            preview: value & layout::OPTION_PREVIEW != 0,
            stream_terminated: value & layout::OPTION_STREAM_TERMINATED != 0,
            force_sync: value & layout::OPTION_FORCE_SYNC != 0,
        }
    }

    pub const fn to_byte(self) -> u8 {
        let mut value = 0;
        if self.preview {
            value |= layout::OPTION_PREVIEW;
        }
        if self.stream_terminated {
            value |= layout::OPTION_STREAM_TERMINATED;
        }
        if self.force_sync {
            value |= layout::OPTION_FORCE_SYNC;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::SacnOptions;

    #[test]
    fn bit_positions() {
        let preview = SacnOptions {
            preview: true,
            ..SacnOptions::default()
        };
        assert_eq!(preview.to_byte(), 0x80);
        assert!(SacnOptions::from_byte(0x40).stream_terminated);
        assert!(SacnOptions::from_byte(0x20).force_sync);
        assert_eq!(SacnOptions::from_byte(0x1F), SacnOptions::default());
    }
}
