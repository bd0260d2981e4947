//! Ledgers of the characters currently in the session

use ahash::AHashMap;
use tracing::debug;

use super::ledger::ProgressionLedger;
use super::persist::LedgerSnapshot;
use crate::core::types::CharacterId;
use crate::services::LedgerContext;

/// In-memory set of live ledgers keyed by character
#[derive(Debug, Default)]
pub struct Roster {
    ledgers: AHashMap<CharacterId, ProgressionLedger>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring a character into the session, fresh or from saved state
    ///
    /// Passives are started and the host's name tag, health and level bar
    /// refreshed. Joining twice keeps the ledger already in the session.
    pub fn join(
        &mut self,
        ctx: &mut LedgerContext<'_>,
        character: CharacterId,
        snapshot: Option<LedgerSnapshot>,
    ) -> &mut ProgressionLedger {
        let ledger = self.ledgers.entry(character).or_insert_with(|| {
            let ledger = match snapshot {
                Some(snapshot) => {
                    ProgressionLedger::hydrate(character, snapshot, ctx.config, ctx.catalog)
                }
                None => ProgressionLedger::new(character, ctx.config),
            };
            ledger.start_passives(ctx.catalog);
            ledger
        });
        if let Ok(Some(archetype)) = ledger.current_archetype(ctx.catalog) {
            ctx.host.decorate_name_tag(character, &archetype.prefix);
        }
        ledger.update_health(ctx);
        ledger.refresh_level_display(ctx);
        debug!("{} joined at level {}", character, ledger.level());
        ledger
    }

    /// Remove a character, stopping its passives; returns what to save
    pub fn leave(&mut self, ctx: &mut LedgerContext<'_>, character: CharacterId) -> Option<LedgerSnapshot> {
        let ledger = self.ledgers.remove(&character)?;
        ledger.stop_passives(ctx.catalog);
        debug!("{} left", character);
        Some(ledger.snapshot())
    }

    pub fn get(&self, character: CharacterId) -> Option<&ProgressionLedger> {
        self.ledgers.get(&character)
    }

    pub fn get_mut(&mut self, character: CharacterId) -> Option<&mut ProgressionLedger> {
        self.ledgers.get_mut(&character)
    }

    pub fn contains(&self, character: CharacterId) -> bool {
        self.ledgers.contains_key(&character)
    }

    pub fn len(&self) -> usize {
        self.ledgers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProgressionLedger> {
        self.ledgers.values()
    }
}
