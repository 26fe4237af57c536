#[cfg(test)]
mod test {
    use colocmine::{ColocationMiner, SpatialObject};

    fn obj(id: &str, kind: &str, x: f64, y: f64) -> SpatialObject<f64> {
        SpatialObject::new(id, kind, x, y)
    }

    /// Five objects, three feature types, one tight A/B/C group plus a
    /// detached A/B pair. C is rarest, so the rank order is C, A, B.
    #[test]
    fn simple() {
        let objects = vec![
            obj("A1", "A", 0., 0.),
            obj("A2", "A", 10., 10.),
            obj("B1", "B", 1., 0.),
            obj("B2", "B", 10., 11.),
            obj("C1", "C", 2., 0.),
        ];
        let miner = ColocationMiner::new(2., 0.5, 2).unwrap();
        let patterns = miner.mine(&objects).unwrap();
        // {C,A} and {C,B} carry half of A resp. B, lifted past 0.5 by the
        // rare-intensity weight; {A,B} participates fully; {C,A,B} extends
        // the C-anchored rows. Size ascends, candidate order within a size.
        let expected: Vec<Vec<String>> = vec![
            vec!["C".into(), "A".into()],
            vec!["C".into(), "B".into()],
            vec!["A".into(), "B".into()],
            vec!["C".into(), "A".into(), "B".into()],
        ];
        assert_eq!(patterns, expected);
    }
}
