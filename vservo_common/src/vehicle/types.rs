//! Data exchanged with the vehicle and perception collaborators.

use crate::consts::RC_LIMIT;

/// One video frame as delivered by the vehicle's stream.
///
/// Pixel content is opaque to the control unit; only perception reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Monotonic frame counter assigned by the stream.
    pub seq: u64,
    pub width: u32,
    pub height: u32,
    /// Packed BGR8 pixels, `width * height * 3` bytes when populated.
    pub data: Vec<u8>,
}

impl Frame {
    /// Frame header without pixel payload.
    pub fn empty(seq: u64, width: u32, height: u32) -> Self {
        Self {
            seq,
            width,
            height,
            data: Vec::new(),
        }
    }
}

/// Perception result for one frame.
///
/// Offsets are the target centroid's displacement from the image centre,
/// normalised to [-1, 1]; positive `v_offset` means the target is below centre.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Detection {
    pub h_offset: f64,
    pub v_offset: f64,
    pub detected: bool,
}

impl Detection {
    /// No target in view.
    pub const NONE: Self = Self {
        h_offset: 0.0,
        v_offset: 0.0,
        detected: false,
    };

    /// A target at the given normalised offsets (clamped to [-1, 1]).
    pub fn at(h_offset: f64, v_offset: f64) -> Self {
        Self {
            h_offset: h_offset.clamp(-1.0, 1.0),
            v_offset: v_offset.clamp(-1.0, 1.0),
            detected: true,
        }
    }
}

/// Four-channel RC command in integer actuator units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RcCommand {
    pub roll: i32,
    pub pitch: i32,
    /// Vertical rate, positive climbs.
    pub vertical: i32,
    /// Yaw rate, positive turns right.
    pub yaw: i32,
}

impl RcCommand {
    /// Neutral hover command.
    pub const HOLD: Self = Self {
        roll: 0,
        pitch: 0,
        vertical: 0,
        yaw: 0,
    };

    /// Yaw/vertical command with roll and pitch neutral, saturated to ±[`RC_LIMIT`].
    pub fn yaw_vertical(yaw: i32, vertical: i32) -> Self {
        Self {
            roll: 0,
            pitch: 0,
            vertical: vertical.clamp(-RC_LIMIT, RC_LIMIT),
            yaw: yaw.clamp(-RC_LIMIT, RC_LIMIT),
        }
    }

    #[inline]
    pub fn is_hold(&self) -> bool {
        *self == Self::HOLD
    }
}
