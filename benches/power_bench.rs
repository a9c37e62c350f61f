use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::path::Path;
use std::time::Duration;

use firepower::power::{
    AvailableSupports, CombatValueBuilder, PowerCalculator, SupportCalculator, SupportLedger,
};
use firepower::ruleset::{load_ruleset, GameData, Side, Unit};

fn ruleset() -> GameData {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/ruleset.json");
    load_ruleset(&path).unwrap()
}

/// A large attacking stack: infantry, artillery, armour, and air.
fn attackers() -> Vec<Unit> {
    let mut units = Vec::new();
    let mix = [
        ("infantry", 12),
        ("artillery", 6),
        ("armour", 4),
        ("fighter", 3),
        ("bomber", 3),
    ];
    let mut id = 1;
    for (unit_type, count) in mix {
        for _ in 0..count {
            units.push(Unit::new(id, unit_type, "Germans"));
            id += 1;
        }
    }
    units
}

fn defenders() -> Vec<Unit> {
    (0..20)
        .map(|i| {
            let unit_type = if i % 4 == 0 { "artillery" } else { "infantry" };
            Unit::new(1000 + i, unit_type, "Russians")
        })
        .collect()
}

fn bench_support_allocation(c: &mut Criterion) {
    let data = ruleset();
    let givers = attackers();
    let rules = data.support_rules();
    let calc = SupportCalculator::new(&givers, &rules, Side::Offense, true, &data);
    let pool = AvailableSupports::get_sorted_support(&calc);
    c.bench_function("give_support_28_units", |b| {
        b.iter(|| {
            let mut pool = black_box(&pool).copy();
            let mut ledger = SupportLedger::new();
            let mut total = 0;
            for unit in &givers {
                total += pool.give_support_to_unit(unit, &mut ledger);
            }
            black_box((total, ledger))
        })
    });
}

fn bench_support_calculator(c: &mut Criterion) {
    let data = ruleset();
    let givers = attackers();
    let rules = data.support_rules();
    c.bench_function("support_calculator_scan", |b| {
        b.iter(|| {
            SupportCalculator::new(black_box(&givers), &rules, Side::Offense, true, &data)
        })
    });
}

fn bench_main_battle(c: &mut Criterion) {
    let data = ruleset();
    let attackers = attackers();
    let defenders = defenders();
    let mut group = c.benchmark_group("main_battle");
    group.measurement_time(Duration::from_secs(5));
    group.bench_function("offense_and_defense", |b| {
        b.iter(|| {
            let offense = CombatValueBuilder::new(&data)
                .friendly_units(attackers.clone())
                .enemy_units(defenders.clone())
                .side(Side::Offense)
                .battle_round(1)
                .attacker("Germans")
                .main_combat_value()
                .unwrap();
            let defense = offense.build_opposite_combat_value();
            let a =
                PowerCalculator::for_units(offense, &attackers).total_power_and_rolls(&attackers);
            let d =
                PowerCalculator::for_units(defense, &defenders).total_power_and_rolls(&defenders);
            black_box((a, d))
        })
    });
    group.finish();
}

fn bench_unit_sort(c: &mut Criterion) {
    let data = ruleset();
    let attackers = attackers();
    let value = CombatValueBuilder::new(&data)
        .friendly_units(attackers.clone())
        .side(Side::Offense)
        .main_combat_value()
        .unwrap();
    c.bench_function("sort_units_strongest_first", |b| {
        b.iter(|| {
            let mut units = attackers.clone();
            value.sort_units(&mut units);
            black_box(units)
        })
    });
}

criterion_group!(
    benches,
    bench_support_allocation,
    bench_support_calculator,
    bench_main_battle,
    bench_unit_sort,
);
criterion_main!(benches);
