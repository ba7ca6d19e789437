//! Builtin MCCS feature definitions and known model quirks.
//!
//! Value names follow the MCCS 2.x tables as published by ddcutil.

use crate::table::{FeatureEntry, FeatureTable, ValueNames};

type Values = &'static [(u16, &'static str)];

const INPUT_SOURCE: Values = &[
    (0x01, "VGA-1"),
    (0x02, "VGA-2"),
    (0x03, "DVI-1"),
    (0x04, "DVI-2"),
    (0x05, "Composite video 1"),
    (0x06, "Composite video 2"),
    (0x07, "S-Video-1"),
    (0x08, "S-Video-2"),
    (0x09, "Tuner-1"),
    (0x0A, "Tuner-2"),
    (0x0B, "Tuner-3"),
    (0x0C, "Component video (YPrPb/YCrCb) 1"),
    (0x0D, "Component video (YPrPb/YCrCb) 2"),
    (0x0E, "Component video (YPrPb/YCrCb) 3"),
    (0x0F, "DisplayPort-1"),
    (0x10, "DisplayPort-2"),
    (0x11, "HDMI-1"),
    (0x12, "HDMI-2"),
];

const NEW_CONTROL: Values = &[
    (0x01, "No new control values"),
    (0x02, "One or more new control values have been saved"),
    (0xFF, "No user controls are present"),
];

const SOFT_CONTROLS: Values = &[
    (0x00, "No button active"),
    (0x01, "Button 1 active"),
    (0x02, "Button 2 active"),
    (0x03, "Button 3 active"),
    (0x04, "Button 4 active"),
    (0x05, "Button 5 active"),
    (0x06, "Button 6 active"),
    (0x07, "Button 7 active"),
    (0xFF, "No user controls are present"),
];

const COLOR_TEMPERATURE: Values = &[
    (0x01, "sRGB"),
    (0x02, "Display Native"),
    (0x03, "4000 K"),
    (0x04, "5000 K"),
    (0x05, "6500 K"),
    (0x06, "7500 K"),
    (0x07, "8200 K"),
    (0x08, "9300 K"),
    (0x09, "10000 K"),
    (0x0A, "11500 K"),
    (0x0B, "User 1"),
    (0x0C, "User 2"),
    (0x0D, "User 3"),
];

const AUTO_SETUP: Values = &[
    (0x00, "Auto setup not active"),
    (0x01, "Performing auto setup"),
    (0x02, "Enable continuous/periodic auto setup"),
];

const SPEAKER_SELECT: Values = &[
    (0x00, "Front L/R"),
    (0x01, "Side L/R"),
    (0x02, "Rear L/R"),
    (0x03, "Center/Subwoofer"),
];

const AMBIENT_LIGHT_SENSOR: Values = &[(0x01, "Disabled"), (0x02, "Enabled")];

const HORIZONTAL_FLIP: Values = &[(0x00, "Normal mode"), (0x01, "Mirrored horizontally mode")];

const VERTICAL_FLIP: Values = &[(0x00, "Normal mode"), (0x01, "Mirrored vertically mode")];

const DISPLAY_SCALING: Values = &[
    (0x01, "No scaling"),
    (0x02, "Max image, no aspect ration distortion"),
    (0x03, "Max vertical image, no aspect ratio distortion"),
    (0x04, "Max horizontal image, no aspect ratio distortion"),
    (0x05, "Max vertical image with aspect ratio distortion"),
    (0x06, "Max horizontal image with aspect ratio distortion"),
    (0x07, "Linear expansion (compression) on horizontal axis"),
    (0x08, "Linear expansion (compression) on h and v axes"),
    (0x09, "Squeeze mode"),
    (0x0A, "Non-linear expansion"),
];

const SHARPNESS: Values = &[
    (0x01, "Filter function 1"),
    (0x02, "Filter function 2"),
    (0x03, "Filter function 3"),
    (0x04, "Filter function 4"),
];

const TV_CHANNEL: Values = &[(0x01, "Increment channel"), (0x02, "Decrement channel")];

const TV_AUDIO_MUTE_SOURCE: Values = &[(0x01, "Mute the audio"), (0x02, "Unmute the audio")];

const AUDIO_STEREO_MODE: Values = &[
    (0x00, "Speaker off/Audio not supported"),
    (0x01, "Mono"),
    (0x02, "Stereo"),
    (0x03, "Stereo expanded"),
    (0x11, "SRS 2.0"),
    (0x12, "SRS 2.1"),
    (0x13, "SRS 3.1"),
    (0x14, "SRS 4.1"),
    (0x15, "SRS 5.1"),
    (0x16, "SRS 6.1"),
    (0x17, "SRS 7.1"),
    (0x21, "Dolby 2.0"),
    (0x22, "Dolby 2.1"),
    (0x23, "Dolby 3.1"),
    (0x24, "Dolby 4.1"),
    (0x25, "Dolby 5.1"),
    (0x26, "Dolby 6.1"),
    (0x27, "Dolby 7.1"),
    (0x31, "THX 2.0"),
    (0x32, "THX 2.1"),
    (0x33, "THX 3.1"),
    (0x34, "THX 4.1"),
    (0x35, "THX 5.1"),
    (0x36, "THX 6.1"),
    (0x37, "THX 7.1"),
];

const WINDOW_CONTROL: Values = &[(0x00, "No effect"), (0x01, "Off"), (0x02, "On")];

const AUTO_SETUP_ON_OFF: Values = &[(0x01, "Off"), (0x02, "On")];

const WINDOW_SELECT: Values = &[
    (0x00, "Full display image area selected except active windows"),
    (0x01, "Window 1 selected"),
    (0x02, "Window 2 selected"),
    (0x03, "Window 3 selected"),
    (0x04, "Window 4 selected"),
    (0x05, "Window 5 selected"),
    (0x06, "Window 6 selected"),
    (0x07, "Window 7 selected"),
];

const SCREEN_ORIENTATION: Values = &[
    (0x01, "0 degrees"),
    (0x02, "90 degrees"),
    (0x03, "180 degrees"),
    (0x04, "270 degrees"),
    (0xFF, "Display cannot supply orientation"),
];

const SETTINGS: Values = &[
    (0x01, "Store current settings in the monitor"),
    (0x02, "Restore factory defaults for current mode"),
];

const SUBPIXEL_LAYOUT: Values = &[
    (0x00, "Sub-pixel layout not defined"),
    (0x01, "Red/Green/Blue vertical stripe"),
    (0x02, "Red/Green/Blue horizontal stripe"),
    (0x03, "Blue/Green/Red vertical stripe"),
    (0x04, "Blue/Green/Red horizontal stripe"),
    (0x05, "Quad pixel, red at top left"),
    (0x06, "Quad pixel, red at bottom left"),
    (0x07, "Delta (triad)"),
    (0x08, "Mosaic"),
];

const DISPLAY_TECHNOLOGY: Values = &[
    (0x01, "CRT (shadow mask)"),
    (0x02, "CRT (aperture grill)"),
    (0x03, "LCD (active matrix)"),
    (0x04, "LCos"),
    (0x05, "Plasma"),
    (0x06, "OLED"),
    (0x07, "EL"),
    (0x08, "MEM"),
];

const DISPLAY_CONTROLLER: Values = &[
    (0x01, "Conexant"),
    (0x02, "Genesis"),
    (0x03, "Macronix"),
    (0x04, "IDT"),
    (0x05, "Mstar"),
    (0x06, "Myson"),
    (0x07, "Phillips"),
    (0x08, "PixelWorks"),
    (0x09, "RealTek"),
    (0x0A, "Sage"),
    (0x0B, "Silicon Image"),
    (0x0C, "SmartASIC"),
    (0x0D, "STMicroelectronics"),
    (0x0E, "Topro"),
    (0x0F, "Trumpion"),
    (0x10, "Welltrend"),
    (0x11, "Samsung"),
    (0x12, "Novatek"),
    (0x13, "STK"),
    (0x14, "Silicon Optics"),
    (0x15, "Texas Instruments"),
    (0x16, "Analogix"),
    (0x17, "Quantum Data"),
    (0x18, "NXP Semiconductors"),
    (0x19, "Chrontel"),
    (0x1A, "Parade Technologies"),
    (0x1B, "THine Electronics"),
    (0x1C, "Trident"),
    (0x1D, "Micros"),
    (0xFF, "Not defined - a manufacturer designed controller"),
];

const OSD: Values = &[
    (0x01, "OSD Disabled"),
    (0x02, "OSD Enabled"),
    (0xFF, "Display cannot supply this information"),
];

const OSD_LANGUAGE: Values = &[
    (0x00, "Reserved value, must be ignored"),
    (0x01, "Chinese (traditional, Hantai)"),
    (0x02, "English"),
    (0x03, "French"),
    (0x04, "German"),
    (0x05, "Italian"),
    (0x06, "Japanese"),
    (0x07, "Korean"),
    (0x08, "Portuguese (Portugal)"),
    (0x09, "Russian"),
    (0x0A, "Spanish"),
    (0x0B, "Swedish"),
    (0x0C, "Turkish"),
    (0x0D, "Chinese (simplified / Kantai)"),
    (0x0E, "Portuguese (Brazil)"),
    (0x0F, "Arabic"),
    (0x10, "Bulgarian"),
    (0x11, "Croatian"),
    (0x12, "Czech"),
    (0x13, "Danish"),
    (0x14, "Dutch"),
    (0x15, "Estonian"),
    (0x16, "Finnish"),
    (0x17, "Greek"),
    (0x18, "Hebrew"),
    (0x19, "Hindi"),
    (0x1A, "Hungarian"),
    (0x1B, "Latvian"),
    (0x1C, "Lithuanian"),
    (0x1D, "Norwegian"),
    (0x1E, "Polish"),
    (0x1F, "Romanian"),
    (0x20, "Serbian"),
    (0x21, "Slovak"),
    (0x22, "Slovenian"),
    (0x23, "Thai"),
    (0x24, "Ukranian"),
    (0x25, "Vietnamese"),
];

const OUTPUT_SELECT: Values = &[
    (0x01, "Analog video (R/G/B) 1"),
    (0x02, "Analog video (R/G/B) 2"),
    (0x03, "Digital video (TDMS) 1"),
    (0x04, "Digital video (TDMS) 22"),
    (0x05, "Composite video 1"),
    (0x06, "Composite video 2"),
    (0x07, "S-Video-1"),
    (0x08, "S-Video-2"),
    (0x09, "Tuner-1"),
    (0x0A, "Tuner-2"),
    (0x0B, "Tuner-3"),
    (0x0C, "Component video (YPrPb/YCrCb) 1"),
    (0x0D, "Component video (YPrPb/YCrCb) 2"),
    (0x0E, "Component video (YPrPb/YCrCb) 3"),
    (0x0F, "DisplayPort-1"),
    (0x10, "DisplayPort-2"),
    (0x11, "HDMI-1"),
    (0x12, "HDMI-2"),
];

// DPM: Display Power Management; DPMS: VESA Display Power Management Signaling.
const POWER_MODE: Values = &[
    (0x01, "DPM: On,  DPMS: Off"),
    (0x02, "DPM: Off, DPMS: Standby"),
    (0x03, "DPM: Off, DPMS: Suspend"),
    (0x04, "DPM: Off, DPMS: Off"),
    (0x05, "Write only value to turn off display"),
];

const AUX_POWER_OUTPUT: Values = &[
    (0x01, "Disable auxiliary power"),
    (0x02, "Enable Auxiliary power"),
];

const SCAN_MODE: Values = &[(0x00, "Normal operation"), (0x01, "Underscan"), (0x02, "Overscan")];

const IMAGE_MODE: Values = &[
    (0x00, "No effect"),
    (0x01, "Full mode"),
    (0x02, "Zoom mode"),
    (0x04, "Variable"),
];

const DISPLAY_APPLICATION: Values = &[
    (0x00, "Standard/Default mode"),
    (0x01, "Productivity"),
    (0x02, "Mixed"),
    (0x03, "Movie"),
    (0x04, "User defined"),
    (0x05, "Games"),
    (0x06, "Sports"),
    (0x07, "Professional (all signal processing disabled)"),
    (0x08, "Standard/Default mode with intermediate power consumption"),
    (0x09, "Standard/Default mode with low power consumption"),
    (0x0A, "Demonstration"),
    (0xF0, "Dynamic contrast"),
];

const WO_OPERATION_MODE: Values = &[(0x01, "Stand alone"), (0x02, "Follower (full PC control)")];

/// `(code, name, hide_extras, values)`
const FEATURES: &[(u8, &str, bool, Values)] = &[
    (0x02, "new control", false, NEW_CONTROL),
    (0x03, "soft controls", false, SOFT_CONTROLS),
    (0x10, "brightness", false, &[]),
    (0x12, "contrast", false, &[]),
    (0x14, "color temperature", false, COLOR_TEMPERATURE),
    (0x16, "red gain", false, &[]),
    (0x18, "green gain", false, &[]),
    (0x1A, "blue gain", false, &[]),
    (0x1E, "auto setup", false, AUTO_SETUP),
    (0x1F, "auto setup 2", false, AUTO_SETUP),
    (0x60, "input", false, INPUT_SOURCE),
    (0x62, "volume", false, &[]),
    (0x63, "speaker select", false, SPEAKER_SELECT),
    (0x66, "ambient light sensor", false, AMBIENT_LIGHT_SENSOR),
    (0x82, "horizontal flip", false, HORIZONTAL_FLIP),
    (0x84, "vertical flip", false, VERTICAL_FLIP),
    (0x86, "display scaling", false, DISPLAY_SCALING),
    (0x87, "sharpness", false, SHARPNESS),
    (0x8B, "tv channel", false, TV_CHANNEL),
    (0x8D, "tv audio mute source", false, TV_AUDIO_MUTE_SOURCE),
    (0x94, "audio stereo mode", false, AUDIO_STEREO_MODE),
    (0x99, "window control", false, WINDOW_CONTROL),
    (0xA2, "auto setup on/off", false, AUTO_SETUP_ON_OFF),
    (0xA5, "window select", false, WINDOW_SELECT),
    (0xAA, "screen orientation", false, SCREEN_ORIENTATION),
    (0xB0, "settings", false, SETTINGS),
    (0xB2, "flat panel subpixel layout", false, SUBPIXEL_LAYOUT),
    (0xB6, "display technology type", true, DISPLAY_TECHNOLOGY),
    (0xC8, "display controller type", true, DISPLAY_CONTROLLER),
    (0xCA, "osd", false, OSD),
    (0xCC, "osd language", false, OSD_LANGUAGE),
    (0xD0, "v2 output select", false, OUTPUT_SELECT),
    (0xD6, "power mode", false, POWER_MODE),
    (0xD7, "aux power output", false, AUX_POWER_OUTPUT),
    (0xDA, "scan mode", false, SCAN_MODE),
    (0xDB, "image mode", false, IMAGE_MODE),
    (0xDC, "display application", false, DISPLAY_APPLICATION),
    (0xDE, "wo operation mode", false, WO_OPERATION_MODE),
    (0xDF, "vcp version", false, &[]),
];

const POWER_ON_OFF: Values = &[(0x01, "On"), (0x04, "Off")];

/// `(model, code, values)`
const MODEL_OVERRIDES: &[(&str, u8, Values)] = &[
    (
        "CRG9_C49RG9xSS (DP)",
        0x60,
        &[(0x06, "HDMI-1"), (0x09, "DisplayPort-1")],
    ),
    ("CRG9_C49RG9xSS (DP)", 0xD6, POWER_ON_OFF),
    ("LG FULLHD(HDMI)", 0x60, &[(0x01, "VGA-1"), (0x04, "HDMI-1")]),
    ("LG FULLHD(HDMI)", 0xD6, POWER_ON_OFF),
];

fn value_names(values: Values) -> ValueNames {
    values
        .iter()
        .map(|&(value, name)| (value, name.to_string()))
        .collect()
}

/// Build the builtin table.
pub(crate) fn table() -> FeatureTable {
    let mut table = FeatureTable::new();
    for &(code, name, hide_extras, values) in FEATURES {
        let mut entry = FeatureEntry::new(name, values.iter().copied());
        entry.hide_extras = hide_extras;
        if let Err(e) = table.insert(code, entry) {
            tracing::error!("Skipping builtin feature 0x{:02X}: {}", code, e);
        }
    }
    for &(model, code, values) in MODEL_OVERRIDES {
        if let Err(e) = table.add_override(model, code, value_names(values)) {
            tracing::error!("Skipping builtin override for {:?}: {}", model, e);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_names_are_unique_and_all_registered() {
        let names: HashSet<&str> = FEATURES.iter().map(|&(_, name, _, _)| name).collect();
        assert_eq!(names.len(), FEATURES.len());
        assert_eq!(table().len(), FEATURES.len());
    }

    #[test]
    fn test_builtin_overrides_resolve() {
        let table = table();
        for &(model, code, values) in MODEL_OVERRIDES {
            let feature = table.for_code(code, Some(model));
            assert_eq!(feature.model.as_deref(), Some(model));
            assert_eq!(feature.value_names, value_names(values));
        }
    }

    #[test]
    fn test_hide_extras_features() {
        let table = table();
        let hidden: Vec<u8> = table
            .codes()
            .filter(|&code| table.for_code(code, None).hide_extras)
            .collect();
        assert_eq!(hidden, vec![0xB6, 0xC8]);
    }

    #[test]
    fn test_continuous_features_resolve_by_name() {
        let table = table();
        let brightness = table.for_name("brightness", None).unwrap();
        assert_eq!(brightness.code, 0x10);
        assert!(brightness.value_names.is_empty());
        assert_eq!(table.for_name("volume", None).unwrap().code, 0x62);
    }
}
