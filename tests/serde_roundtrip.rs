use mesh_structure::topology::refine::kuhn_triangle;
use mesh_structure::topology::{EntitySet, Multiindex, ReferenceElementMap};

#[test]
fn descriptors_roundtrip_through_json() {
    let t = kuhn_triangle(2).unwrap();
    let sets: Vec<EntitySet> = t.all_entity_sets().to_vec();
    let maps: Vec<ReferenceElementMap> = t.maps().to_vec();
    let json = serde_json::to_string(&(sets.clone(), maps.clone())).unwrap();
    let (sets_back, maps_back): (Vec<EntitySet>, Vec<ReferenceElementMap>) =
        serde_json::from_str(&json).unwrap();
    assert_eq!(sets_back, sets);
    assert_eq!(maps_back, maps);

    let mi = Multiindex::new(t.vertex_set().unwrap(), vec![1i64, 0]);
    let back: Multiindex<i64> = serde_json::from_str(&serde_json::to_string(&mi).unwrap()).unwrap();
    assert_eq!(back, mi);
}
