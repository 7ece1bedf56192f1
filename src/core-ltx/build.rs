fn main() {
    // (environment variable, cfg flag) pairs used to gate live provider tests
    let keys = [
        ("OPENAI_API_KEY", "has_openai_key"),
        ("GEMINI_API_KEY", "has_gemini_key"),
        ("ANTHROPIC_API_KEY", "has_anthropic_key"),
    ];

    for (env_var, cfg) in keys {
        // Declare the custom cfg so rustc knows about it
        println!("cargo::rustc-check-cfg=cfg({cfg})");
        println!("cargo::rerun-if-env-changed={env_var}");

        // Emit the cfg flag if the key is set
        if let Ok(api_key) = std::env::var(env_var)
            && !api_key.is_empty()
        {
            println!("cargo::rustc-cfg={cfg}");
        }
    }
}
