use serde::Serialize;

/// Spendable credits. The ledger never goes below zero on its own accord:
/// `debit` trusts that the caller checked `can_afford` in the same step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    credits: u32,
    cap: u32,
    #[serde(skip)]
    regen_amount: u32,
}

impl Ledger {
    pub fn new(credits: u32, cap: u32, regen_amount: u32) -> Self {
        Self {
            credits: credits.min(cap),
            cap,
            regen_amount,
        }
    }

    pub fn credits(&self) -> u32 {
        self.credits
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    pub fn set_credits(&mut self, credits: u32) {
        self.credits = credits.min(self.cap);
    }

    pub fn can_afford(&self, cost: u32) -> bool {
        self.credits >= cost
    }

    pub fn debit(&mut self, cost: u32) {
        debug_assert!(self.can_afford(cost), "debit of {cost} without a passing can_afford");
        self.credits = self.credits.saturating_sub(cost);
    }

    /// Adds the regeneration increment, capped. Returns the credits actually added.
    pub fn regenerate(&mut self) -> u32 {
        let before = self.credits;
        self.credits = self.credits.saturating_add(self.regen_amount).min(self.cap);
        self.credits - before
    }
}
