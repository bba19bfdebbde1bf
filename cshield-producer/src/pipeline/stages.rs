//! Processing stages and the stage-token lookup table
//!
//! The stepper shows five ordered stages. The backend reports finer-grained
//! tokens (`sharding` / `sharding_done`, ...) which collapse onto the same
//! stage. `error` is a terminal token with no stage of its own.

use serde::{Deserialize, Serialize};

/// Ordered pipeline stages as shown by the stepper
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Cleanup,
    Sharding,
    Encrypting,
    Manifest,
    Done,
}

/// All stages in display order; index in this slice is the StageIndex
pub const STAGES: [Stage; 5] = [
    Stage::Cleanup,
    Stage::Sharding,
    Stage::Encrypting,
    Stage::Manifest,
    Stage::Done,
];

/// Number of stepper stages
pub const STAGE_COUNT: usize = STAGES.len();

impl Stage {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Cleanup => "Cleanup",
            Stage::Sharding => "Sharding",
            Stage::Encrypting => "Encrypting",
            Stage::Manifest => "Manifest",
            Stage::Done => "Done",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Step token carried by a progress message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageToken {
    Cleanup,
    Sharding,
    ShardingDone,
    Encrypting,
    EncryptingDone,
    Manifest,
    ManifestDone,
    Done,
    Error,
}

/// Wire name → token → stage. `Error` maps to no stage.
const TOKEN_TABLE: [(&str, StageToken, Option<Stage>); 9] = [
    ("cleanup", StageToken::Cleanup, Some(Stage::Cleanup)),
    ("sharding", StageToken::Sharding, Some(Stage::Sharding)),
    ("sharding_done", StageToken::ShardingDone, Some(Stage::Sharding)),
    ("encrypting", StageToken::Encrypting, Some(Stage::Encrypting)),
    ("encrypting_done", StageToken::EncryptingDone, Some(Stage::Encrypting)),
    ("manifest", StageToken::Manifest, Some(Stage::Manifest)),
    ("manifest_done", StageToken::ManifestDone, Some(Stage::Manifest)),
    ("done", StageToken::Done, Some(Stage::Done)),
    ("error", StageToken::Error, None),
];

impl StageToken {
    /// Look up a wire token; unknown tokens yield `None`
    pub fn parse(raw: &str) -> Option<Self> {
        TOKEN_TABLE
            .iter()
            .find(|(name, _, _)| *name == raw)
            .map(|(_, token, _)| *token)
    }

    pub fn as_str(self) -> &'static str {
        TOKEN_TABLE
            .iter()
            .find(|(_, token, _)| *token == self)
            .map(|(name, _, _)| *name)
            .unwrap_or("unknown")
    }

    /// Stage this token advances the stepper to
    pub fn stage(self) -> Option<Stage> {
        TOKEN_TABLE
            .iter()
            .find(|(_, token, _)| *token == self)
            .and_then(|(_, _, stage)| *stage)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, StageToken::Done | StageToken::Error)
    }
}

/// Map a raw step string straight to a StageIndex
///
/// Unknown tokens and `error` yield `None`, which the monitor treats as a
/// no-op for the stepper.
pub fn stage_index(raw: &str) -> Option<usize> {
    StageToken::parse(raw)
        .and_then(StageToken::stage)
        .map(Stage::index)
}
