use nametab_core::{NameTable, Slot, TableStats};

const SURNAMES: [&str; 7] = [
    "Ivanov", "Petrov", "Sidorov", "Komarov", "Lebedev", "Smirnov", "Popov",
];

fn record(n: usize) -> String {
    format!(
        "{} Vladislav Andreevich Toyota Camry 16:48 {}",
        SURNAMES[(n - 1) % SURNAMES.len()],
        n
    )
}

#[test]
fn distinct_inserts_track_size_and_load() {
    let mut table = NameTable::with_capacity(10);
    for n in 1..=50 {
        table.insert(&record(n), n).unwrap();
        assert_eq!(table.len(), n);
        assert!(table.load_factor() < 0.7, "load {} at n={n}", table.load_factor());
    }
    for n in 1..=50 {
        assert_eq!(table.search(&record(n)).unwrap().line_number, Some(n));
    }
}

#[test]
fn growth_doubles_before_the_seventh_insert() {
    let mut table = NameTable::with_capacity(10);
    for n in 1..=6 {
        table.insert(&record(n), n).unwrap();
    }
    assert_eq!(table.capacity(), 10);

    // The pre-insert check sees (6 + 1) / 10 = 0.7 and doubles first.
    table.insert(&record(7), 7).unwrap();
    assert_eq!(table.capacity(), 20);
    assert_eq!(table.len(), 7);
}

#[test]
fn full_session_scenario() {
    let mut table = NameTable::with_capacity(10);
    for n in 1..=6 {
        table.insert(&record(n), n).unwrap();
    }
    let popov = "Popov Vladislav Andreevich Toyota Camry 16:48 7";
    table.insert(popov, 7).unwrap();
    assert_eq!(table.capacity(), 20);

    let probe = table.search(popov).unwrap();
    assert_eq!(probe.line_number, Some(7));
    assert!(probe.steps >= 1);

    assert!(table.remove(popov).unwrap());
    assert_eq!(table.search(popov).unwrap().line_number, None);

    // len dropped to 6 and 6/20 <= 0.3, so the remove halved the table.
    assert_eq!(table.capacity(), 10);
    assert_eq!(table.len(), 6);

    // Survivors are intact after the shrink rehash.
    for n in 1..=6 {
        assert_eq!(table.search(&record(n)).unwrap().line_number, Some(n));
    }
}

#[test]
fn rehash_preserves_live_mappings_and_purges_tombstones() {
    let mut table = NameTable::with_capacity(10);
    for n in 1..=5 {
        table.insert(&record(n), n).unwrap();
    }
    assert!(table.remove(&record(2)).unwrap());
    assert_eq!(TableStats::collect(&table).tombstones, 1);

    // Push past the growth threshold; the rehash drops the tombstone.
    for n in 6..=8 {
        table.insert(&record(n), n).unwrap();
    }
    assert_eq!(table.capacity(), 20);
    let stats = TableStats::collect(&table);
    assert_eq!(stats.tombstones, 0);
    assert_eq!(stats.occupied, 7);

    for n in (1..=8).filter(|&n| n != 2) {
        assert_eq!(table.search(&record(n)).unwrap().line_number, Some(n));
    }
    assert_eq!(table.search(&record(2)).unwrap().line_number, None);
}

#[test]
fn shrink_never_drops_below_minimum_capacity() {
    let mut table = NameTable::with_capacity(10);
    for n in 1..=7 {
        table.insert(&record(n), n).unwrap();
    }
    assert_eq!(table.capacity(), 20);
    for n in 1..=7 {
        table.remove(&record(n)).unwrap();
        assert!(table.capacity() >= 10);
    }
    assert_eq!(table.capacity(), 10);
    assert_eq!(table.len(), 0);
}

#[test]
fn stored_hash_matches_the_probe_start_after_rehash() {
    let mut table = NameTable::with_capacity(10);
    for n in 1..=7 {
        table.insert(&record(n), n).unwrap();
    }
    // After the grow every entry was re-placed; its stored hash must be a
    // valid bucket of the new capacity and every key must still resolve.
    for entry in table.slots().iter().filter_map(Slot::entry) {
        assert!(entry.stored_hash < table.capacity());
    }
    for n in 1..=7 {
        assert!(table.search(&record(n)).unwrap().line_number.is_some());
    }
}
