//! バッファテーブル
//!
//! 固定数のスロットを持つバッファプール。スロットは移動せず、その場でリセットされる。
//! 同じファイル名を持つアクティブなスロットは高々一つ。

use super::{Buffer, SlotId, SCRATCH_SLOT};

/// 複数のバッファを管理する構造体
#[derive(Debug, Clone)]
pub struct BufferTable {
    slots: Vec<Buffer>,
    /// エディタに表示中のスロット（常にアクティブ）
    current: SlotId,
}

impl BufferTable {
    /// `slots` 個のスロットを確保し、スロット0をスクラッチとして開く
    pub fn new(slots: usize, buffer_capacity: usize) -> Self {
        let mut slots: Vec<Buffer> = (0..slots.max(1)).map(|_| Buffer::new(buffer_capacity)).collect();
        slots[SCRATCH_SLOT].activate("");
        slots[SCRATCH_SLOT].set_dirty(false, true);

        Self {
            slots,
            current: SCRATCH_SLOT,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, slot: SlotId) -> Option<&Buffer> {
        self.slots.get(slot)
    }

    pub(crate) fn get_mut(&mut self, slot: SlotId) -> Option<&mut Buffer> {
        self.slots.get_mut(slot)
    }

    pub fn current_slot(&self) -> SlotId {
        self.current
    }

    pub fn current(&self) -> &Buffer {
        &self.slots[self.current]
    }

    pub(crate) fn current_mut(&mut self) -> &mut Buffer {
        &mut self.slots[self.current]
    }

    /// アクティブなスロットを表示対象にする
    pub fn set_current(&mut self, slot: SlotId) -> bool {
        match self.slots.get(slot) {
            Some(buffer) if buffer.is_active() => {
                self.current = slot;
                true
            }
            _ => false,
        }
    }

    /// ファイル名で開いているスロットを探す
    pub fn find_open(&self, filename: &str) -> Option<SlotId> {
        if filename.is_empty() {
            return None;
        }
        self.slots
            .iter()
            .position(|buffer| buffer.is_active() && buffer.filename() == Some(filename))
    }

    /// 開いているスロットがあればそれを、なければ最初の未使用スロットを返す
    ///
    /// プールが枯渇していれば `None`。
    pub fn find_or_allocate(&self, filename: &str) -> Option<SlotId> {
        self.find_open(filename)
            .or_else(|| self.slots.iter().position(|buffer| !buffer.is_active()))
    }

    /// スロットを閉じる
    ///
    /// スクラッチスロットは閉じられない。表示中のスロットを閉じた場合は
    /// それより前の最も近いアクティブスロットに切り替える。
    pub fn close(&mut self, slot: SlotId) -> bool {
        if slot == SCRATCH_SLOT {
            log::info!("scratch buffer cannot be closed");
            return false;
        }
        let Some(buffer) = self.slots.get_mut(slot) else {
            return false;
        };
        if !buffer.is_active() {
            return false;
        }

        buffer.reset();
        if self.current == slot {
            self.current = (0..slot)
                .rev()
                .find(|&candidate| self.slots[candidate].is_active())
                .unwrap_or(SCRATCH_SLOT);
        }
        true
    }

    /// アクティブなスロット（タブ順）
    pub fn active_slots(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, buffer)| buffer.is_active())
            .map(|(slot, _)| slot)
    }

    pub fn active_count(&self) -> usize {
        self.active_slots().count()
    }

    /// 次のタブ（末尾から先頭へ折り返す）
    pub fn next_tab(&self) -> SlotId {
        let active: Vec<SlotId> = self.active_slots().collect();
        let pos = active.iter().position(|&s| s == self.current).unwrap_or(0);
        active[(pos + 1) % active.len()]
    }

    /// 前のタブ（先頭から末尾へ折り返す）
    pub fn prev_tab(&self) -> SlotId {
        let active: Vec<SlotId> = self.active_slots().collect();
        let pos = active.iter().position(|&s| s == self.current).unwrap_or(0);
        active[(pos + active.len() - 1) % active.len()]
    }

    /// 不変条件を満たしているか
    pub fn invariants_hold(&self) -> bool {
        let scratch_active = self.slots[SCRATCH_SLOT].is_active();
        let current_active = self.slots[self.current].is_active();
        let mut names: Vec<&str> = self
            .slots
            .iter()
            .filter(|b| b.is_active())
            .filter_map(|b| b.filename())
            .collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        scratch_active && current_active && names.len() == total
    }
}
