//! Identity chains and entries, entirely offline

use factom_client::address::IdentityKey;
use factom_client::core::identity::{
    active_keys_at_height, build_key_replacement, new_identity_chain_from_keys,
};
use factom_client::core::{entry_cost, Entry};
use factom_client::FactomError;

fn keys(n: u8) -> Vec<IdentityKey> {
    (1..=n).map(|i| IdentityKey::from_seed(&[i; 32]).unwrap()).collect()
}

#[test]
fn test_key_history_over_heights() {
    let initial = keys(3);
    let chain = new_identity_chain_from_keys(&["Alice", "Smith"], &initial).unwrap();
    let chain_id = chain.chain_id_hex();
    let first = chain.get_first_entry().clone();
    let fresh = IdentityKey::from_seed(&[9u8; 32]).unwrap();
    let fresher = IdentityKey::from_seed(&[10u8; 32]).unwrap();

    // top key replaces the lowest slot at height 10
    let r1 = build_key_replacement(&chain_id, &initial[2].pub_string(), &fresh.pub_string(), &initial[0]).unwrap();
    // lowest slot tries to replace the top one at height 20 and is ignored
    let r2 = build_key_replacement(&chain_id, &initial[0].pub_string(), &fresher.pub_string(), &fresh).unwrap();
    // reusing a retired key at height 30 is ignored too
    let r3 = build_key_replacement(&chain_id, &fresh.pub_string(), &initial[2].pub_string(), &initial[0]).unwrap();
    let history = vec![(10, r1), (20, r2), (30, r3)];

    let pubs = |ks: &[&IdentityKey]| ks.iter().map(|k| k.pub_string()).collect::<Vec<_>>();
    assert_eq!(
        active_keys_at_height(&first, &history, 9).unwrap(),
        pubs(&[&initial[0], &initial[1], &initial[2]])
    );
    for height in [10, 20, 30, 1000] {
        let active = active_keys_at_height(&first, &history, height).unwrap();
        assert_eq!(active, pubs(&[&initial[0], &initial[1], &fresh]), "height {height}");
    }
}

#[test]
fn test_entry_bytes_round_trip_and_cost() {
    let entry = Entry::new([7u8; 32], vec![b"a".to_vec(), vec![]], vec![0u8; 1500]);
    let bytes = entry.marshal().unwrap();
    assert_eq!(Entry::unmarshal(&bytes).unwrap(), entry);
    assert_eq!(entry.cost().unwrap(), 2);

    assert_eq!(entry_cost(0).unwrap(), 1);
    assert_eq!(entry_cost(1024).unwrap(), 1);
    assert_eq!(entry_cost(1025).unwrap(), 2);
    assert_eq!(entry_cost(10240).unwrap(), 10);
    assert_eq!(
        entry_cost(10241).unwrap_err(),
        FactomError::EntryTooLarge { size: 10241 }
    );
}
