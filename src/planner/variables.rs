use crate::error::{PlanError, Result};
use crate::models::ItemId;

/// Index of one decision variable in the model's dense layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

impl VarId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// The five variable families of the procurement model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarFamily {
    Order,
    Eat,
    Inventory,
    Packages,
    OrderWeek,
}

impl VarFamily {
    pub fn prefix(self) -> &'static str {
        match self {
            VarFamily::Order => "order",
            VarFamily::Eat => "eat",
            VarFamily::Inventory => "inventory",
            VarFamily::Packages => "packages",
            VarFamily::OrderWeek => "order_week",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarDomain {
    NonNegativeInteger,
    Binary,
}

/// Dense variable layout for a `weeks × items` horizon.
///
/// Per-item families occupy consecutive blocks of `weeks * items` slots
/// (week-major, then item); the `weeks` order-week flags come last. The
/// same `(week, item)` pair always maps to the same `VarId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableModel {
    weeks: usize,
    items: usize,
}

const PER_ITEM_FAMILIES: [VarFamily; 4] = [
    VarFamily::Order,
    VarFamily::Eat,
    VarFamily::Inventory,
    VarFamily::Packages,
];

impl VariableModel {
    pub fn new(weeks: usize, items: usize) -> Result<Self> {
        if weeks == 0 {
            return Err(PlanError::InvalidHorizon(weeks));
        }
        if items == 0 {
            return Err(PlanError::EmptyCatalog);
        }
        Ok(Self { weeks, items })
    }

    pub fn weeks(&self) -> usize {
        self.weeks
    }

    pub fn items(&self) -> usize {
        self.items
    }

    #[inline]
    fn block(&self) -> usize {
        self.weeks * self.items
    }

    #[inline]
    fn slot(&self, family: usize, week: usize, item: ItemId) -> VarId {
        debug_assert!(week < self.weeks && item.index() < self.items);
        VarId(family * self.block() + week * self.items + item.index())
    }

    #[inline]
    pub fn order(&self, week: usize, item: ItemId) -> VarId {
        self.slot(0, week, item)
    }

    #[inline]
    pub fn eat(&self, week: usize, item: ItemId) -> VarId {
        self.slot(1, week, item)
    }

    #[inline]
    pub fn inventory(&self, week: usize, item: ItemId) -> VarId {
        self.slot(2, week, item)
    }

    #[inline]
    pub fn packages(&self, week: usize, item: ItemId) -> VarId {
        self.slot(3, week, item)
    }

    #[inline]
    pub fn order_week(&self, week: usize) -> VarId {
        debug_assert!(week < self.weeks);
        VarId(4 * self.block() + week)
    }

    /// Total number of variables.
    pub fn len(&self) -> usize {
        4 * self.block() + self.weeks
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Family, week and item (absent for order-week flags) of a variable.
    pub fn locate(&self, var: VarId) -> (VarFamily, usize, Option<ItemId>) {
        let block = self.block();
        let idx = var.index();
        if idx >= 4 * block {
            return (VarFamily::OrderWeek, idx - 4 * block, None);
        }
        let family = PER_ITEM_FAMILIES[idx / block];
        let offset = idx % block;
        (family, offset / self.items, Some(ItemId(offset % self.items)))
    }

    pub fn domain(&self, var: VarId) -> VarDomain {
        match self.locate(var).0 {
            VarFamily::OrderWeek => VarDomain::Binary,
            _ => VarDomain::NonNegativeInteger,
        }
    }

    /// Stable name such as `eat[3,12]` or `order_week[3]`.
    pub fn name(&self, var: VarId) -> String {
        match self.locate(var) {
            (family, week, Some(item)) => {
                format!("{}[{},{}]", family.prefix(), week, item.index())
            }
            (family, week, None) => format!("{}[{}]", family.prefix(), week),
        }
    }

    /// Every variable with its domain, in layout order.
    pub fn declarations(&self) -> impl Iterator<Item = (VarId, VarDomain)> + '_ {
        (0..self.len()).map(move |idx| (VarId(idx), self.domain(VarId(idx))))
    }
}
