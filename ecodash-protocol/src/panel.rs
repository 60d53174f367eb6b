//! Message types for the display panel protocol
//!
//! The panel owns rendering, layout and touch input; the controller only
//! tells it what each field currently reads. Messages flow controller →
//! panel exclusively.

use crate::frame::{Frame, FrameError};

// Message type IDs: controller → panel
pub const MSG_SET_FIELD: u8 = 0x10;
pub const MSG_BACKLIGHT: u8 = 0x11;
pub const MSG_RENDER: u8 = 0x12;
pub const MSG_CLEAR: u8 = 0x1F;

/// Maximum text length for a field value
pub const MAX_FIELD_TEXT: usize = 16;

/// Dashboard fields addressable on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldId {
    /// Instrument-bus speed readout
    Speed,
    /// GPS ground speed readout
    GroundSpeed,
}

// Wire format values
const FIELD_SPEED: u8 = 0x01;
const FIELD_GROUND_SPEED: u8 = 0x02;

impl FieldId {
    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            FieldId::Speed => FIELD_SPEED,
            FieldId::GroundSpeed => FIELD_GROUND_SPEED,
        }
    }

    /// Parse a field id from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            FIELD_SPEED => Some(FieldId::Speed),
            FIELD_GROUND_SPEED => Some(FieldId::GroundSpeed),
            _ => None,
        }
    }
}

/// Messages from the controller to the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelMessage<'a> {
    /// Update the displayed value of one field
    SetField { field: FieldId, text: &'a str },
    /// Set panel backlight brightness (0-100 percent)
    Backlight { percent: u8 },
    /// Repaint the screen with the current field values
    Render,
    /// Reset all fields to their boot placeholders
    Clear,
}

impl<'a> PanelMessage<'a> {
    /// Encode this message into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            PanelMessage::SetField { field, text } => {
                if text.len() > MAX_FIELD_TEXT {
                    return Err(FrameError::PayloadTooLarge);
                }
                let mut payload = [0u8; MAX_FIELD_TEXT + 1];
                payload[0] = field.to_byte();
                payload[1..1 + text.len()].copy_from_slice(text.as_bytes());
                Frame::new(MSG_SET_FIELD, &payload[..1 + text.len()])
            }
            PanelMessage::Backlight { percent } => {
                Frame::new(MSG_BACKLIGHT, &[(*percent).min(100)])
            }
            PanelMessage::Render => Ok(Frame::empty(MSG_RENDER)),
            PanelMessage::Clear => Ok(Frame::empty(MSG_CLEAR)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_id_roundtrip() {
        for field in [FieldId::Speed, FieldId::GroundSpeed] {
            assert_eq!(FieldId::from_byte(field.to_byte()), Some(field));
        }
        assert_eq!(FieldId::from_byte(0xFF), None);
    }

    #[test]
    fn test_set_field_frame_layout() {
        let msg = PanelMessage::SetField {
            field: FieldId::Speed,
            text: "20",
        };
        let frame = msg.to_frame().unwrap();
        assert_eq!(frame.msg_type, MSG_SET_FIELD);
        assert_eq!(&frame.payload[..], &[0x01, b'2', b'0']);
    }

    #[test]
    fn test_set_field_text_too_long() {
        let msg = PanelMessage::SetField {
            field: FieldId::GroundSpeed,
            text: "a field value that is too long",
        };
        assert_eq!(msg.to_frame(), Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_backlight_clamped() {
        let frame = PanelMessage::Backlight { percent: 250 }.to_frame().unwrap();
        assert_eq!(frame.msg_type, MSG_BACKLIGHT);
        assert_eq!(&frame.payload[..], &[100]);
    }

    #[test]
    fn test_render_and_clear_have_no_payload() {
        assert!(PanelMessage::Render.to_frame().unwrap().payload.is_empty());
        assert!(PanelMessage::Clear.to_frame().unwrap().payload.is_empty());
    }
}
