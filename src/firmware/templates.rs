//! Static `config.h` and `rules.mk` templates.
//!
//! Pure substitution: nothing here looks at the keymap itself, only at the
//! unlock coordinates and the feature switches.

// Allow format! appended to String - more readable for building templates
#![allow(clippy::format_push_string)]

use crate::constants::APP_BINARY_NAME;
use crate::models::{Profile, UnlockCombo};
use serde::{Deserialize, Serialize};

/// Default `VIAL_KEYBOARD_UID`. Changing the last byte forces Vial to reset
/// its stored layout.
pub const DEFAULT_KEYBOARD_UID: [u8; 8] = [0x89, 0xAB, 0xCD, 0xEF, 0x01, 0x23, 0x45, 0x77];

/// Firmware features switched in `rules.mk`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// `BOOTLOADER` value
    pub bootloader: String,
    /// `AUDIO_ENABLE`
    pub audio: bool,
    /// `MUSIC_ENABLE`
    pub music: bool,
    /// `LTO_ENABLE`
    pub lto: bool,
    /// `COMBO_ENABLE`
    pub combo: bool,
    /// `KEY_OVERRIDE_ENABLE`
    pub key_override: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            bootloader: "stm32-dfu".to_string(),
            audio: true,
            music: true,
            lto: true,
            combo: true,
            key_override: true,
        }
    }
}

/// Values substituted into the templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateConfig {
    /// Which template set to emit
    pub profile: Profile,
    /// `VIAL_KEYBOARD_UID` bytes
    pub keyboard_uid: [u8; 8],
    /// Unlock combo in target matrix coordinates
    pub unlock: UnlockCombo,
    /// `rules.mk` switches
    pub features: FeatureFlags,
    /// Generation time for the banner, if stamping is on
    pub generated_at: Option<String>,
}

/// Fills the `config.h` and `rules.mk` templates.
pub struct TemplateEmitter<'a> {
    config: &'a TemplateConfig,
}

impl<'a> TemplateEmitter<'a> {
    /// Creates an emitter over `config`.
    #[must_use]
    pub const fn new(config: &'a TemplateConfig) -> Self {
        Self { config }
    }

    /// Renders `config.h`.
    #[must_use]
    pub fn config_h(&self) -> String {
        match self.config.profile {
            Profile::Vial => self.vial_config_h(),
            Profile::Plain => self.plain_config_h(),
        }
    }

    /// Renders `rules.mk`.
    #[must_use]
    pub fn rules_mk(&self) -> String {
        let features = &self.config.features;
        let mut out = String::new();

        out.push_str(&format!("# Generated by {APP_BINARY_NAME}\n"));
        if let Some(stamp) = &self.config.generated_at {
            out.push_str(&format!("# Generated at {stamp}\n"));
        }
        match self.config.profile {
            Profile::Vial => out.push_str("# Planck Rev6 Vial keymap build rules\n\n"),
            Profile::Plain => out.push_str("# Planck Rev6 keymap build rules\n\n"),
        }

        out.push_str(&format!("BOOTLOADER = {}\n\n", features.bootloader));

        if self.config.profile == Profile::Vial {
            out.push_str("# Vial support (dynamic remapping GUI)\n");
            out.push_str("VIA_ENABLE = yes\n");
            out.push_str("VIAL_ENABLE = yes\n\n");
        }

        out.push_str("# Tap dance support (required for TD() keycodes)\n");
        out.push_str("TAP_DANCE_ENABLE = yes\n\n");

        if self.config.profile == Profile::Vial {
            out.push_str("# The keymap defines its own tap_dance_actions\n");
            out.push_str("VIAL_TAP_DANCE_ENABLE = no\n\n");
        }

        out.push_str("# Audio support (the rev6 has a speaker)\n");
        out.push_str(&format!("AUDIO_ENABLE = {}\n", yes_no(features.audio)));
        out.push_str(&format!("MUSIC_ENABLE = {}\n\n", yes_no(features.music)));

        out.push_str("# Link-time optimization (reduces firmware size)\n");
        out.push_str(&format!("LTO_ENABLE = {}\n\n", yes_no(features.lto)));

        out.push_str("# Introspection\n");
        out.push_str(&format!("COMBO_ENABLE = {}\n", yes_no(features.combo)));
        out.push_str(&format!("KEY_OVERRIDE_ENABLE = {}\n", yes_no(features.key_override)));

        out
    }

    fn vial_config_h(&self) -> String {
        let uid: Vec<String> = self
            .config
            .keyboard_uid
            .iter()
            .map(|byte| format!("0x{byte:02X}"))
            .collect();
        let unlock = &self.config.unlock;
        let pairs: Vec<String> = unlock
            .keys
            .iter()
            .map(|key| format!("({},{})", key.row, key.col))
            .collect();

        let mut out = String::from("#pragma once\n\n/* Vial Configuration for Planck Rev6 */\n\n");
        out.push_str("/* 1. Vial UID - Unique identifier for this keyboard in Vial app */\n");
        out.push_str("/* Change the last byte to force a layout reset if needed */\n");
        out.push_str(&format!("#define VIAL_KEYBOARD_UID {{{}}}\n\n", uid.join(", ")));

        out.push_str("/* 2. Unlock Combo - Press these keys simultaneously to unlock Vial editing */\n");
        out.push_str(&format!(
            "/* Matrix positions {}: left half = rows 0-3, right half = rows 4-7 */\n",
            pairs.join(" and ")
        ));
        out.push_str(&format!("#define VIAL_UNLOCK_COMBO_ROWS {}\n", c_list(&unlock.rows())));
        out.push_str(&format!("#define VIAL_UNLOCK_COMBO_COLS {}\n\n", c_list(&unlock.cols())));

        out.push_str("/* 3. Keep vial.c from defining a second tap_dance_actions */\n");
        out.push_str("/* vial.h turns VIAL_TAP_DANCE_ENABLE on; include it first, then undefine it. */\n");
        out.push_str("#include \"quantum/vial.h\"\n");
        out.push_str("#ifdef VIAL_TAP_DANCE_ENABLE\n#undef VIAL_TAP_DANCE_ENABLE\n#endif\n");
        out
    }

    fn plain_config_h(&self) -> String {
        let mut out = String::from("#pragma once\n\n");
        out.push_str("/* Tapping term for tap dances and mod-taps (Oryx uses about 200ms) */\n");
        out.push_str("#define TAPPING_TERM 200\n\n");

        out.push_str("/* Mouse keys tuned to feel like Oryx */\n");
        out.push_str("#define MOUSEKEY_INTERVAL 16\n");
        out.push_str("#define MOUSEKEY_DELAY 0\n");
        out.push_str("#define MOUSEKEY_TIME_TO_MAX 60\n");
        out.push_str("#define MOUSEKEY_MAX_SPEED 7\n");
        out.push_str("#define MOUSEKEY_WHEEL_DELAY 0\n\n");

        if self.config.features.audio {
            out.push_str("#ifdef AUDIO_ENABLE\n");
            out.push_str("    #define STARTUP_SONG SONG(PLANCK_SOUND)\n");
            out.push_str("    #define AUDIO_CLICKY\n");
            out.push_str("#endif\n\n");
        }

        out.push_str("#define COMBO_COUNT 0\n");
        out
    }
}

const fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn c_list(values: &[u8]) -> String {
    let items: Vec<String> = values.iter().map(u8::to_string).collect();
    format!("{{ {} }}", items.join(", "))
}
