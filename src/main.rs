//! Skill Ledger - demo session
//!
//! Loads a catalog and progression policy, plays one character through
//! picking an archetype, gaining experience, investing points and casting,
//! then prints the character's saved state as JSON.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use skill_ledger::catalog::{
    load_catalog_dir, load_catalog_file, AbilityFault, CastContext, PassiveBehavior, ShotBehavior,
    TargetedBehavior,
};
use skill_ledger::core::types::TargetId;
use skill_ledger::{
    AbilityId, ArchetypeId, BehaviorRegistry, CharacterId, LedgerSnapshot, MemoryServices,
    ProgressionConfig, Result, Roster, SlotId,
};

/// Skill Ledger - play a scripted progression session
#[derive(Parser, Debug)]
#[command(name = "skill-ledger")]
#[command(about = "Run a scripted progression session against a catalog")]
struct Args {
    /// Catalog file, or a directory of catalog files
    #[arg(long, default_value = "data/catalog.toml")]
    catalog: PathBuf,

    /// Progression policy (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Archetype to start in
    #[arg(long, default_value = "warrior")]
    archetype: String,

    /// Archetype to profess into after leveling, if allowed
    #[arg(long)]
    profess: Option<String>,

    /// Experience granted during the session
    #[arg(long, default_value_t = 2000)]
    experience: u64,

    /// Resume from a saved snapshot
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Write the final snapshot here instead of stdout
    #[arg(long)]
    save: Option<PathBuf>,
}

struct Announce;

impl ShotBehavior for Announce {
    fn cast(&self, cast: &CastContext<'_>) -> std::result::Result<bool, AbilityFault> {
        info!("{} uses {} (level {})", cast.caster, cast.ability, cast.level);
        Ok(true)
    }
}

impl TargetedBehavior for Announce {
    fn cast(
        &self,
        cast: &CastContext<'_>,
        target: TargetId,
        ally: bool,
    ) -> std::result::Result<bool, AbilityFault> {
        let side = if ally { "ally" } else { "enemy" };
        info!(
            "{} uses {} (level {}) on {} {}",
            cast.caster, cast.ability, cast.level, side, target.0
        );
        Ok(true)
    }
}

impl PassiveBehavior for Announce {
    fn initialize(&self, character: CharacterId, level: u32) {
        info!("{} passive active at level {}", character, level);
    }

    fn stop(&self, character: CharacterId, level: u32) {
        info!("{} passive level {} stopped", character, level);
    }
}

fn demo_behaviors() -> BehaviorRegistry {
    let mut behaviors = BehaviorRegistry::new();
    behaviors.register_shot("slash", Announce);
    behaviors.register_passive("bulwark", Announce);
    behaviors.register_targeted("charge", Announce);
    behaviors.register_targeted("firebolt", Announce);
    behaviors.register_passive("mana shield", Announce);
    behaviors
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skill_ledger=info".into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ProgressionConfig::load(path)?,
        None => ProgressionConfig::default(),
    };
    let behaviors = demo_behaviors();
    let catalog = if args.catalog.is_dir() {
        load_catalog_dir(&args.catalog, &behaviors)?
    } else {
        load_catalog_file(&args.catalog, &behaviors)?
    };
    info!(
        "Loaded {} archetypes and {} abilities",
        catalog.archetypes.len(),
        catalog.abilities.len()
    );

    let snapshot = match &args.resume {
        Some(path) => Some(LedgerSnapshot::load(path)?),
        None => None,
    };

    let character = CharacterId::new();
    let mut services = MemoryServices::permissive();
    services.host.spawn(character, config.base_health);
    services.host.place_target(character, TargetId(1), 8.0, false);

    let mut roster = Roster::new();
    let mut ctx = services.context(&config, &catalog);
    let ledger = roster.join(&mut ctx, character, snapshot);

    if !ledger.has_archetype() {
        ledger.set_archetype(&mut ctx, Some(ArchetypeId::new(&args.archetype)))?;
    }
    ledger.grant_experience(&mut ctx, args.experience)?;
    info!(
        "Level {} with {} points ({} experience to next)",
        ledger.level(),
        ledger.points(),
        ledger.exp_to_next_level(&config)
    );

    if let Some(target) = &args.profess {
        let target = ArchetypeId::new(target);
        if ledger.profess(&mut ctx, &target)? {
            info!("Professed into {}", target);
        } else {
            info!("Cannot profess into {} yet", target);
        }
    }

    // spend points cheapest-first until nothing else is affordable
    loop {
        let mut candidates: Vec<(u32, AbilityId)> = ledger
            .skills()
            .iter()
            .filter_map(|(id, level)| {
                let ability = catalog.ability(id)?;
                (level < ability.max_level).then(|| (ability.cost_at(level + 1), id.clone()))
            })
            .collect();
        candidates.sort();
        if !candidates
            .iter()
            .any(|(_, id)| ledger.upgrade(&mut ctx, id))
        {
            break;
        }
    }

    for (slot, (id, _)) in ledger.skills().invested().into_iter().enumerate() {
        if catalog.ability(&id).map_or(false, |a| !a.is_passive()) {
            ledger.bind(SlotId::new((slot + 1).to_string()), &id);
        }
    }
    let slots: Vec<SlotId> = ledger.skills().bindings().map(|(slot, _)| slot.clone()).collect();
    for slot in slots {
        if let Some(outcome) = ledger.cast_slot(&mut ctx, &slot)? {
            info!("Slot {}: {:?}", slot, outcome);
        }
    }

    let Some(snapshot) = roster.leave(&mut ctx, character) else {
        return Ok(());
    };
    match &args.save {
        Some(path) => {
            snapshot.save(path)?;
            info!("Saved snapshot to {}", path.display());
        }
        None => println!("{}", snapshot.to_json()?),
    }
    Ok(())
}
