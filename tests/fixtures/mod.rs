//! Shared Oryx-style keymap sources for integration and CLI tests.
#![allow(dead_code)] // Each test crate uses a different subset

use std::fs;
use std::path::{Path, PathBuf};

/// Code Oryx emits ahead of the `keymaps` array.
const PRELUDE: &str = r#"#include QMK_KEYBOARD_H
#include "version.h"
#ifdef AUDIO_ENABLE
#include "muse.h"
#endif

enum custom_keycodes {
  RGB_SLD = ZSA_SAFE_RANGE,
  ST_MACRO_0,
};

enum planck_layers {
  _BASE,
  _LOWER,
  _RAISE,
  _ADJUST,
};

enum tap_dance_codes {
  DANCE_0,
};

#define LOWER MO(_LOWER)
#define RAISE MO(_RAISE)

"#;

/// Handlers and the tap dance table Oryx emits after the array.
const POSTLUDE: &str = r#"

bool process_record_user(uint16_t keycode, keyrecord_t *record) {
  switch (keycode) {
    case ST_MACRO_0:
    if (record->event.pressed) {
      SEND_STRING(SS_TAP(X_A) SS_DELAY(100) SS_TAP(X_B));
    }
    break;
  }
  return true;
}

typedef struct {
    bool is_press_action;
    uint8_t step;
} tap;

enum {
    SINGLE_TAP = 1,
    SINGLE_HOLD,
    DOUBLE_TAP,
    DOUBLE_HOLD,
    DOUBLE_SINGLE_TAP,
    MORE_TAPS
};

static tap dance_state[1];

uint8_t dance_step(tap_dance_state_t *state);

uint8_t dance_step(tap_dance_state_t *state) {
    if (state->count == 1) {
        if (state->interrupted || !state->pressed) return SINGLE_TAP;
        else return SINGLE_HOLD;
    } else if (state->count == 2) {
        if (state->interrupted) return DOUBLE_SINGLE_TAP;
        else if (state->pressed) return DOUBLE_HOLD;
        else return DOUBLE_TAP;
    }
    return MORE_TAPS;
}

void on_dance_0(tap_dance_state_t *state, void *user_data);
void dance_0_finished(tap_dance_state_t *state, void *user_data);
void dance_0_reset(tap_dance_state_t *state, void *user_data);

void on_dance_0(tap_dance_state_t *state, void *user_data) {
    if(state->count == 3) {
        tap_code16(KC_ESCAPE);
        tap_code16(KC_ESCAPE);
        tap_code16(KC_ESCAPE);
    }
    if(state->count > 3) {
        tap_code16(KC_ESCAPE);
    }
}

void dance_0_finished(tap_dance_state_t *state, void *user_data) {
    dance_state[0].step = dance_step(state);
    switch (dance_state[0].step) {
        case SINGLE_TAP: register_code16(KC_ESCAPE); break;
        case SINGLE_HOLD: register_code16(KC_LEFT_CTRL); break;
        case DOUBLE_TAP: register_code16(KC_ESCAPE); register_code16(KC_ESCAPE); break;
        case DOUBLE_SINGLE_TAP: tap_code16(KC_ESCAPE); register_code16(KC_ESCAPE);
    }
}

void dance_0_reset(tap_dance_state_t *state, void *user_data) {
    wait_ms(10);
    switch (dance_state[0].step) {
        case SINGLE_TAP: unregister_code16(KC_ESCAPE); break;
        case SINGLE_HOLD: unregister_code16(KC_LEFT_CTRL); break;
        case DOUBLE_TAP: unregister_code16(KC_ESCAPE); break;
        case DOUBLE_SINGLE_TAP: unregister_code16(KC_ESCAPE); break;
    }
    dance_state[0].step = 0;
}

tap_dance_action_t tap_dance_actions[] = {
        [DANCE_0] = ACTION_TAP_DANCE_FN_ADVANCED(on_dance_0, dance_0_finished, dance_0_reset),
};

uint32_t layer_state_set_user(uint32_t state) {
  return update_tri_layer_state(state, _LOWER, _RAISE, _ADJUST);
}

#ifdef AUDIO_ENABLE
bool muse_mode = false;
uint16_t muse_counter = 0;
uint16_t muse_tempo = 50;
#endif

void matrix_scan_user(void) {
#ifdef AUDIO_ENABLE
  if (muse_mode) {
    muse_counter = (muse_counter + 1) % muse_tempo;
  }
#endif
}
"#;

/// Names of the layers in [`oryx_keymap`], in order.
pub const ORYX_LAYERS: [&str; 4] = ["_BASE", "_LOWER", "_RAISE", "_ADJUST"];

fn base_layer() -> Vec<String> {
    [
        "KC_TAB", "KC_Q", "KC_W", "KC_E", "KC_R", "KC_T", "KC_Y", "KC_U", "KC_I", "KC_O", "KC_P", "KC_BSPC",
        "TD(DANCE_0)", "KC_A", "KC_S", "LT(_RAISE, KC_D)", "KC_F", "KC_G", "KC_H", "KC_J", "KC_K", "KC_L",
        "KC_SCLN", "KC_QUOTE", "KC_LEFT_SHIFT", "KC_Z", "KC_X", "KC_C", "KC_V", "KC_B", "KC_N", "KC_M",
        "KC_COMMA", "KC_DOT", "KC_SLASH", "MT(MOD_RSFT, KC_ENTER)", "ST_MACRO_0", "KC_LEFT_CTRL",
        "KC_LEFT_ALT", "KC_LEFT_GUI", "LOWER", "KC_SPACE", "KC_SPACE", "RAISE", "KC_LEFT", "KC_DOWN",
        "KC_UP", "KC_RIGHT",
    ]
    .iter()
    .map(|key| (*key).to_string())
    .collect()
}

/// A 48-key layer of `KC_TRANSPARENT` with `overrides` applied at the
/// given flat indexes.
pub fn transparent_layer(overrides: &[(usize, &str)]) -> Vec<String> {
    let mut keys = vec!["KC_TRANSPARENT".to_string(); 48];
    for (index, key) in overrides {
        keys[*index] = (*key).to_string();
    }
    keys
}

/// 48 distinct keys, `KC_0` to `KC_47`.
pub fn numbered_layer() -> Vec<String> {
    (0..48).map(|i| format!("KC_{i}")).collect()
}

/// The `keymaps` array as Oryx writes it, one `LAYOUT_planck_grid` per layer.
pub fn keymap_array(layers: &[(&str, Vec<String>)]) -> String {
    let mut out = String::from("const uint16_t PROGMEM keymaps[][MATRIX_ROWS][MATRIX_COLS] = {\n");
    for (name, keys) in layers {
        out.push_str(&format!("  [{name}] = LAYOUT_planck_grid(\n    {}\n  ),\n", keys.join(", ")));
    }
    out.push_str("};");
    out
}

/// A full Oryx export: includes, enums, four layers, tap dance handlers,
/// the tap dance table and the ZSA-specific hooks.
pub fn oryx_keymap() -> String {
    let layers = vec![
        (ORYX_LAYERS[0], base_layer()),
        (
            ORYX_LAYERS[1],
            transparent_layer(&[(0, "KC_TILD"), (1, "KC_EXLM"), (2, "KC_AT"), (11, "KC_DELETE")]),
        ),
        (
            ORYX_LAYERS[2],
            transparent_layer(&[(0, "KC_GRAVE"), (1, "KC_1"), (2, "KC_2"), (40, "KC_NO")]),
        ),
        (ORYX_LAYERS[3], transparent_layer(&[(0, "QK_BOOT"), (12, "RGB_SLD"), (23, "AU_TOGG")])),
    ];
    format!("{PRELUDE}{}{POSTLUDE}", keymap_array(&layers))
}

/// A minimal source: an include, a layer enum and the given layers.
pub fn simple_keymap(layers: &[(&str, Vec<String>)]) -> String {
    let names: Vec<&str> = layers.iter().map(|(name, _)| *name).collect();
    format!(
        "#include QMK_KEYBOARD_H\n\nenum layers {{ {} }};\n\n{}\n",
        names.join(", "),
        keymap_array(layers)
    )
}

/// Writes `content` to `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write fixture file");
    path
}
