//! Symbol pools and palettes for each lock stage
//!
//! Identifiers are platform icon names; the renderer resolves them.

use pcpos_core::Color;
use serde::{Deserialize, Serialize};

/// Top-level lock stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceIdStage {
    Locked,
    Scanning,
    Unlocked,
}

/// Thematic group of icons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolCategory {
    Core,
    Security,
    Face,
    Alert,
    Access,
    Patterns,
    Tech,
    Ambient,
    Motion,
    Other,
}

impl SymbolCategory {
    pub const ALL: [SymbolCategory; 10] = [
        SymbolCategory::Core,
        SymbolCategory::Security,
        SymbolCategory::Face,
        SymbolCategory::Alert,
        SymbolCategory::Access,
        SymbolCategory::Patterns,
        SymbolCategory::Tech,
        SymbolCategory::Ambient,
        SymbolCategory::Motion,
        SymbolCategory::Other,
    ];
}

/// Icons of one category for one stage, ten each
pub fn category_symbols(stage: FaceIdStage, category: SymbolCategory) -> &'static [&'static str] {
    use FaceIdStage::*;
    use SymbolCategory::*;
    match (stage, category) {
        (Locked, Core) => &[
            "lock.fill", "lock.circle", "lock.square",
            "lock.shield", "lock.doc", "lock.rectangle",
            "lock.slash", "lock.circle.fill", "lock.square.fill",
            "lock.app.dashed",
        ],
        (Locked, Security) => &[
            "shield.fill", "key.fill", "checkmark.shield",
            "shield.slash", "key.icloud", "shield.lefthalf.filled.slash",
            "key.radiowaves.forward", "lock.shield.fill", "shield.checkered",
            "key.card",
        ],
        (Locked, Face) => &[
            "person.crop.circle", "face.dashed", "eye.slash",
            "person.fill.questionmark", "eye.trianglebadge.exclamationmark", "person.crop.square",
            "person.crop.circle.badge.questionmark", "eye.half.closed", "face.dashed.fill",
            "person.slash",
        ],
        (Locked, Alert) => &[
            "exclamationmark.triangle", "bell.fill", "hand.raised.fill",
            "exclamationmark.octagon", "bell.slash", "exclamationmark.circle",
            "xmark.octagon", "hand.raised.slash", "bell.and.waves.left.and.right",
            "exclamationmark.bubble",
        ],
        (Locked, Access) => &[
            "hand.tap", "touchid", "lock.open.trianglebadge.exclamationmark",
            "hand.point.up.left", "hand.draw", "hand.tap.fill",
            "rectangle.and.hand.point.up.left", "hand.point.up.braille", "ipad.and.arrow.forward",
            "iphone.gen3.radiowaves.left.and.right",
        ],
        (Locked, Patterns) => &[
            "circle.grid.3x3", "square.grid.2x2", "circle.dashed",
            "square.grid.3x3", "circle.grid.2x2", "square.grid.4x3.fill",
            "circle.grid.cross", "grid", "square.dotted",
            "circle.grid.3x3.fill",
        ],
        (Locked, Tech) => &[
            "cpu", "memorychip", "antenna.radiowaves.left.and.right",
            "chip", "externaldrive.badge.lock", "server.rack",
            "network.badge.shield.half.filled", "lock.laptopcomputer", "cable.connector",
            "sim.card",
        ],
        (Locked, Ambient) => &[
            "moon.fill", "sparkle", "cloud.fill",
            "moon.stars", "cloud.moon", "moon.zzz",
            "cloud.fog", "zzz", "moon.haze",
            "snowflake",
        ],
        (Locked, Motion) => &[
            "arrow.clockwise", "arrow.triangle.2.circlepath", "rotate.right",
            "arrow.counterclockwise", "rotate.left", "arrow.2.circlepath",
            "arrow.clockwise.circle", "arrow.uturn.backward", "arrow.triangle.capsulepath",
            "arrow.circlepath",
        ],
        (Locked, Other) => &[
            "circle", "square", "triangle",
            "diamond", "pentagon", "octagon",
            "capsule", "seal", "oval",
            "rhombus",
        ],

        (Scanning, Core) => &[
            "faceid", "viewfinder", "camera.metering.center.weighted",
            "camera.viewfinder", "viewfinder.circle", "camera.aperture",
            "camera.metering.spot", "camera.metering.matrix", "camera.metering.partial",
            "camera.filters",
        ],
        (Scanning, Security) => &[
            "lock.rotation", "shield.lefthalf.filled", "key.viewfinder",
            "lock.rotation.open", "shield.righthalf.filled", "checkmark.shield.fill.questionmark",
            "key.horizontal", "lock.badge.clock", "shield.pattern.checkered",
            "key.2.on.ring",
        ],
        (Scanning, Face) => &[
            "face.smiling", "eye", "person.fill.viewfinder",
            "eye.fill", "eyes", "eyebrow",
            "nose", "mouth", "person.crop.rectangle",
            "eye.circle",
        ],
        (Scanning, Alert) => &[
            "waveform.path.ecg", "dot.radiowaves.left.and.right", "sensor.fill",
            "waveform.path", "sensor", "dot.radiowaves.right",
            "waveform", "waveform.circle", "bell.badge.waveform",
            "dot.radiowaves.up.forward",
        ],
        (Scanning, Access) => &[
            "hourglass", "timer", "ellipsis.circle",
            "hourglass.bottomhalf.filled", "hourglass.tophalf.filled", "stopwatch",
            "clock.arrow.circlepath", "progress.indicator", "ellipsis.rectangle",
            "timer.circle",
        ],
        (Scanning, Patterns) => &[
            "scope", "circle.hexagongrid", "dot.circle.and.hand.point.up.left.fill",
            "circle.hexagonpath", "hexagon.fill", "circle.circle",
            "target", "circle.dashed.inset.filled", "square.dashed.inset.filled",
            "smallcircle.filled.circle",
        ],
        (Scanning, Tech) => &[
            "barcode.viewfinder", "qrcode.viewfinder", "wave.3.right",
            "barcode", "qrcode", "dot.scope",
            "lidar.sensor", "camera.badge.ellipsis", "sensor.tag.radiowaves.forward",
            "cellularbars",
        ],
        (Scanning, Ambient) => &[
            "light.max", "sun.min", "sparkles",
            "light.min", "sun.haze", "lightspectrum.horizontal",
            "light.beacon.max", "sun.dust", "flashlight.on.fill",
            "lightbulb.max",
        ],
        (Scanning, Motion) => &[
            "arrow.triangle.2.circlepath.camera", "arrow.up.and.down.and.arrow.left.and.right", "rays",
            "arrow.left.and.right", "arrow.up.and.down", "dial.medium",
            "arrow.up.left.and.arrow.down.right", "arrow.down.left.and.arrow.up.right", "arrow.triangle.turn.up.right.circle",
            "arrow.left.arrow.right",
        ],
        (Scanning, Other) => &[
            "circle.dotted", "square.dashed", "hexagon",
            "triangle.fill", "circle.bottomhalf.filled", "square.split.diagonal",
            "circle.lefthalf.filled", "square.on.circle", "circle.and.line.horizontal",
            "app.dashed",
        ],

        (Unlocked, Core) => &[
            "lock.open.fill", "lock.open", "checkmark.circle.fill",
            "checkmark", "checkmark.seal.fill", "lock.open.rotation",
            "checkmark.circle", "checkmark.square.fill", "lock.open.display",
            "checkmark.rectangle.fill",
        ],
        (Unlocked, Security) => &[
            "checkmark.shield.fill", "key.horizontal.fill", "person.badge.shield.checkmark",
            "shield.righthalf.filled.badge.checkmark", "lock.shield.badge.checkmark", "key.radiowaves.forward.fill",
            "person.badge.key.fill", "shield.checkered.fill", "key.viewfinder.fill",
            "checkmark.icloud.fill",
        ],
        (Unlocked, Face) => &[
            "face.smiling.inverse", "heart.fill", "hand.wave.fill",
            "person.crop.circle.badge.checkmark", "person.fill.checkmark", "hands.clap.fill",
            "hand.thumbsup.circle", "face.smiling.fill", "heart.circle.fill",
            "person.wave.2.fill",
        ],
        (Unlocked, Alert) => &[
            "bell.badge.fill", "star.fill", "party.popper.fill",
            "bell.badge", "checkmark.bubble.fill", "star.bubble.fill",
            "megaphone.fill", "bell.and.waves.left.and.right.fill", "exclamationmark.2",
            "music.note",
        ],
        (Unlocked, Access) => &[
            "door.left.hand.open", "arrow.right.circle.fill", "hand.thumbsup.fill",
            "door.right.hand.open", "arrow.forward.circle.fill", "hand.point.right.fill",
            "rectangle.portrait.and.arrow.right", "figure.walk.arrival", "arrow.right.to.line.compact",
            "house.fill",
        ],
        (Unlocked, Patterns) => &[
            "seal.fill", "burst.fill", "rosette",
            "star.circle.fill", "sparkle.magnifyingglass", "burst",
            "staroflife.fill", "asterisk.circle.fill", "circle.hexagongrid.fill",
            "star.square.fill",
        ],
        (Unlocked, Tech) => &[
            "bolt.fill", "wifi", "antenna.radiowaves.left.and.right.circle",
            "bolt.circle.fill", "wifi.circle.fill", "battery.100.bolt",
            "bolt.horizontal.fill", "icloud.fill", "dot.radiowaves.left.and.right.circle",
            "bolt.badge.checkmark",
        ],
        (Unlocked, Ambient) => &[
            "sun.max.fill", "sparkles.rectangle.stack", "rainbow",
            "sun.max", "sunrise.fill", "sparkles.square.filled.on.square",
            "cloud.sun.fill", "sun.and.horizon.fill", "sparkles.tv",
            "moon.stars.fill",
        ],
        (Unlocked, Motion) => &[
            "arrow.up.forward", "wind", "tornado",
            "arrow.up.right.circle.fill", "hurricane", "arrow.up.circle.fill",
            "figure.dance", "wind.snow", "arrow.up.forward.app",
            "paperplane.fill",
        ],
        (Unlocked, Other) => &[
            "star.circle", "heart.circle", "diamond.fill",
            "suit.heart.fill", "suit.diamond.fill", "suit.club.fill",
            "suit.spade.fill", "star.leadinghalf.filled", "heart.square.fill",
            "gift.fill",
        ],
    }
}

/// Every icon for a stage, category by category
pub fn symbol_pool(stage: FaceIdStage) -> Vec<&'static str> {
    SymbolCategory::ALL
        .iter()
        .flat_map(|category| category_symbols(stage, *category).iter().copied())
        .collect()
}

const LOCKED_PALETTE: [u32; 4] = [0x5B6B8C, 0x8A9BB8, 0xC7D2E6, 0xE05A5A];
const SCANNING_PALETTE: [u32; 4] = [0x2EC4E6, 0x5AE0D0, 0x8C7CF0, 0xFFFFFF];
const UNLOCKED_PALETTE: [u32; 5] = [0x4CD97B, 0xFFD25A, 0xFF8FB1, 0x7FD8FF, 0xFFFFFF];

/// Redistribution palette for a stage
pub fn stage_palette(stage: FaceIdStage) -> Vec<Color> {
    let hex: &[u32] = match stage {
        FaceIdStage::Locked => &LOCKED_PALETTE,
        FaceIdStage::Scanning => &SCANNING_PALETTE,
        FaceIdStage::Unlocked => &UNLOCKED_PALETTE,
    };
    hex.iter().map(|rgb| Color::from_hex(*rgb)).collect()
}
