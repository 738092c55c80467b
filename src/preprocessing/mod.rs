//! Audio preprocessing modules
//!
//! Utilities for preparing decoded audio for labelling and feature extraction:
//! - Channel mixing (multi-channel to mono)

pub mod channel_mixer;
