#[path = "common/mod.rs"]
mod common;
use common::{assert_snapshot, load_fixture};
use railswitch::{run, InputLayout, RunConfig};
use test_case::test_case;

#[test_case("branching", InputLayout::FirstChild ; "first child layout")]
#[test_case("explicit_switch", InputLayout::ExplicitSwitch ; "explicit switch layout")]
#[test_case("detached", InputLayout::FirstChild ; "detached fragment")]
fn answers_match_golden(name: &str, layout: InputLayout) {
    let input = load_fixture(&format!("{}.txt", name));
    let config = RunConfig::default().with_layout(layout);
    let report = run(&input, &config).expect("fixture should process");
    assert_snapshot(&format!("answers/{}.out", name), &report.render());
}
