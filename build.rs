use std::collections::HashSet;
use std::path::Path;

fn main() {
    let catalog_path = Path::new("catalogs/invoice_samples.json");
    validate_catalog_file(catalog_path);
    set_build_dependencies();
}

fn validate_catalog_file(catalog_path: &Path) {
    // Ensure catalog exists at build time
    assert!(
        catalog_path.exists(),
        "\n\nCATALOG BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the sample catalog before building.\n",
        catalog_path.display()
    );

    let catalog_contents = std::fs::read_to_string(catalog_path).unwrap_or_else(|e| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            catalog_path.display()
        );
    });

    let catalog: serde_json::Value = serde_json::from_str(&catalog_contents).unwrap_or_else(|e| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Invalid JSON\n\
             Path: {}\n\
             Error: {e}\n\
             Hint: Check for missing commas, brackets, or invalid syntax.\n",
            catalog_path.display()
        );
    });

    validate_catalog_structure(&catalog);
}

fn validate_catalog_structure(catalog: &serde_json::Value) {
    assert!(
        catalog.is_object(),
        "\n\nCATALOG BUILD ERROR: Root must be a JSON object\n\
         Got: {catalog}\n"
    );

    let samples = catalog.get("samples").unwrap_or_else(|| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Missing 'samples' field\n\
             The catalog must have a top-level 'samples' array.\n"
        );
    });

    let samples = samples.as_array().unwrap_or_else(|| {
        panic!(
            "\n\nCATALOG BUILD ERROR: 'samples' must be an array\n\
             Got: {samples}\n"
        );
    });

    validate_samples(samples);

    println!(
        "cargo:warning=Validated sample catalog: {} samples",
        samples.len()
    );
}

fn validate_samples(samples: &[serde_json::Value]) {
    let mut seen = HashSet::new();

    for (i, sample) in samples.iter().enumerate() {
        let id = sample
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or_else(|| {
                panic!("\n\nCATALOG BUILD ERROR: Sample at index {i} missing string 'id' field\n")
            });

        assert!(
            seen.insert(id.to_string()),
            "\n\nCATALOG BUILD ERROR: Duplicate sample id '{id}' (index {i})\n"
        );

        assert!(
            sample.get("document").is_some_and(serde_json::Value::is_object),
            "\n\nCATALOG BUILD ERROR: Sample '{id}' (index {i}) must have an object 'document' field\n"
        );
    }
}

fn set_build_dependencies() {
    // Tell cargo to rerun if catalog changes
    println!("cargo:rerun-if-changed=catalogs/invoice_samples.json");

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
