use fm_analyzer::analysis::ModelAnalyzer;
use fm_analyzer::config::AnalysisConfig;
use fm_analyzer::explain::Explainable;
use fm_analyzer::model::{FeatureId, FeatureModel, FeatureRecord, GroupType};
use fm_analyzer::monitor::NullMonitor;
use fm_analyzer::sat::dpll::DpllOracle;
use fm_analyzer::sat::expr::Expr;
use fm_analyzer::sat::literal::Literal;
use fm_analyzer::sat::solver::SatOracle;
use test_log::test;

fn ids(model: &FeatureModel, names: &[&str]) -> Vec<FeatureId> {
    names.iter().filter_map(|n| model.get(n)).collect()
}

/// A with an or-group {B, C} and the constraint B => !C.
fn exclusive_or_model() -> FeatureModel {
    FeatureModel::from_records(
        vec![
            FeatureRecord::root("A").group(GroupType::Or),
            FeatureRecord::child("B", "A"),
            FeatureRecord::child("C", "A"),
        ],
        vec![Expr::implies("B".into(), Expr::not("C".into()))],
    )
    .unwrap()
}

#[test]
fn exclusive_or_group_has_only_root_in_core() {
    let model = exclusive_or_model();
    let mut analyzer = ModelAnalyzer::new(&model, AnalysisConfig::default()).unwrap();
    assert!(!analyzer.is_void().unwrap());
    let (core, dead) = analyzer.core_and_dead(&NullMonitor).unwrap();
    assert_eq!(core, ids(&model, &["A"]));
    assert!(dead.is_empty());
}

#[test]
fn core_and_dead_match_unit_propagation() {
    // Every feature decided here is decided by unit propagation alone.
    let model = FeatureModel::from_records(
        vec![
            FeatureRecord::root("R"),
            FeatureRecord::child("A", "R").mandatory(),
            FeatureRecord::child("B", "A").mandatory(),
            FeatureRecord::child("C", "R"),
            FeatureRecord::child("D", "C"),
        ],
        vec![Expr::implies("B".into(), Expr::not("C".into()))],
    )
    .unwrap();
    let mut analyzer = ModelAnalyzer::new(&model, AnalysisConfig::default()).unwrap();
    let (core, dead) = analyzer.core_and_dead(&NullMonitor).unwrap();

    let cnf = analyzer.cnf().clone();
    let implied = cnf.unit_propagate(&[]).unwrap();
    let forced = |id: FeatureId, value: bool| {
        implied.contains(&Literal::new(analyzer.variable(id), value))
    };
    assert_eq!(core, ids(&model, &["R", "A", "B"]));
    assert_eq!(dead, ids(&model, &["C", "D"]));
    assert!(core.iter().all(|&f| forced(f, true)));
    assert!(dead.iter().all(|&f| forced(f, false)));
}

#[test]
fn dead_feature_explanation_replays() {
    let model = FeatureModel::from_records(
        vec![
            FeatureRecord::root("R"),
            FeatureRecord::child("A", "R").mandatory(),
            FeatureRecord::child("B", "R"),
        ],
        vec![Expr::implies("B".into(), Expr::not("A".into()))],
    )
    .unwrap();
    let analyzer = ModelAnalyzer::new(&model, AnalysisConfig::default()).unwrap();
    let b = analyzer.variable(model.get("B").unwrap());
    let explanation = analyzer
        .explain(Explainable::DeadFeature(b))
        .unwrap()
        .unwrap();

    assert!(explanation.replay());
    assert!(explanation.reason_count() > 0);

    // The cited clauses alone refute the premise.
    let cited = analyzer.cnf().subset(explanation.clauses());
    let mut oracle = DpllOracle::new(cited);
    assert!(!oracle.is_satisfiable(explanation.premises()).unwrap());
}

#[test]
fn live_feature_has_no_explanation() {
    let model = exclusive_or_model();
    let analyzer = ModelAnalyzer::new(&model, AnalysisConfig::default()).unwrap();
    let b = analyzer.variable(model.get("B").unwrap());
    assert!(analyzer.explain(Explainable::DeadFeature(b)).unwrap().is_none());
}

#[test]
fn full_report_describes_every_finding() {
    let model = FeatureModel::from_records(
        vec![
            FeatureRecord::root("R"),
            FeatureRecord::child("A", "R").mandatory(),
            FeatureRecord::child("B", "R"),
            FeatureRecord::child("E", "R"),
        ],
        vec![
            Expr::implies("B".into(), Expr::not("A".into())),
            Expr::implies("A".into(), "E".into()),
        ],
    )
    .unwrap();
    let mut analyzer = ModelAnalyzer::new(&model, AnalysisConfig::default()).unwrap();
    let report = analyzer.analyze(&NullMonitor).unwrap();

    assert_eq!(report.dead, ids(&model, &["B"]));
    assert_eq!(report.false_optional, ids(&model, &["E"]));
    assert!(report.explanations.iter().all(|e| e.replay()));

    let text = report.describe(&model);
    assert!(text.contains('B'));
    assert!(text.contains('E'));
}
