//! 描画用スナップショット
//!
//! シェルが描画に使う状態を一つの値にまとめる。デバッグログにも JSON として書き出す。

use super::EditorSession;
use crate::buffer::SlotId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub directory: String,
    pub files: Vec<String>,
    pub buffers: Vec<BufferSnapshot>,
    pub active_slot: SlotId,
    pub finder: FinderSnapshot,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BufferSnapshot {
    pub slot: SlotId,
    pub label: String,
    pub filename: Option<String>,
    pub dirty: bool,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinderSnapshot {
    pub visible: bool,
    pub query: String,
    pub matches: Vec<String>,
    pub match_count: usize,
    pub selection: Option<usize>,
}

impl SessionSnapshot {
    pub fn capture(session: &EditorSession) -> Self {
        let table = session.buffers();
        let buffers = table
            .active_slots()
            .filter_map(|slot| table.get(slot).map(|buffer| (slot, buffer)))
            .map(|(slot, buffer)| BufferSnapshot {
                slot,
                label: buffer.display_label().to_string(),
                filename: buffer.filename().map(str::to_string),
                dirty: buffer.is_dirty(),
                content: buffer.content().to_string(),
            })
            .collect();

        let matches: Vec<String> = session
            .fuzzy_matches()
            .into_iter()
            .map(str::to_string)
            .collect();

        Self {
            directory: session.directory().display().to_string(),
            files: session.files().to_vec(),
            buffers,
            active_slot: session.active_slot(),
            finder: FinderSnapshot {
                visible: session.finder().is_open(),
                query: session.finder().query().to_string(),
                match_count: matches.len(),
                matches,
                selection: session.finder().selection(),
            },
            error: session.error_message().map(str::to_string),
        }
    }

    /// 表示中バッファのスナップショット
    pub fn active_buffer(&self) -> Option<&BufferSnapshot> {
        self.buffers.iter().find(|b| b.slot == self.active_slot)
    }
}
