//! Resource-stock accessor used for capacity resolution and refunds.

use ordnance_core::components::{Loadout, StockSlot};
use ordnance_core::enums::SkillSlot;

pub trait StockAccess {
    fn stock(&self, slot: SkillSlot) -> StockSlot;

    /// Add one unit if below the slot maximum. Returns whether anything was added.
    fn add_one_stock(&mut self, slot: SkillSlot) -> bool;

    /// Spend one unit if any is left. Returns whether anything was spent.
    fn deduct_stock(&mut self, slot: SkillSlot) -> bool;
}

impl StockAccess for Loadout {
    fn stock(&self, slot: SkillSlot) -> StockSlot {
        *self.slot(slot)
    }

    fn add_one_stock(&mut self, slot: SkillSlot) -> bool {
        let slot = self.slot_mut(slot);
        if slot.stock < slot.max_stock {
            slot.stock += 1;
            true
        } else {
            false
        }
    }

    fn deduct_stock(&mut self, slot: SkillSlot) -> bool {
        let slot = self.slot_mut(slot);
        if slot.stock > 0 {
            slot.stock -= 1;
            true
        } else {
            false
        }
    }
}
