use terra_ngin::config::EngineConfig;

fn main() -> anyhow::Result<()> {
    terra_ngin::flow::run(EngineConfig::from_env())
}
