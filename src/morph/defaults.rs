//! Default-valued fields that are left out when a morphology is saved.

use serde_yaml::{Mapping, Sequence, Value};

use super::{Morphology, SpecKind};

fn stratum_defaults() -> [(&'static str, Value); 3] {
    [
        ("description", Value::from("")),
        ("build-depends", Value::Sequence(Sequence::new())),
        ("products", Value::Sequence(Sequence::new())),
    ]
}

fn chunk_spec_defaults() -> [(&'static str, Value); 4] {
    [
        ("build-mode", Value::from("staging")),
        ("prefix", Value::from("/usr")),
        ("build-depends", Value::Sequence(Sequence::new())),
        ("submodules", Value::Mapping(Mapping::new())),
    ]
}

fn strip(mapping: &mut Mapping, defaults: &[(&'static str, Value)]) {
    for (key, default) in defaults {
        if mapping.get(*key) == Some(default) {
            mapping.shift_remove(*key);
        }
    }
}

/// Removes fields whose value equals the default for the morphology's kind.
///
/// Only strata carry defaults at the moment: the stratum's own fields and
/// the fields of each of its chunk specs. Other kinds are left unchanged.
pub fn unset_defaults(morph: &mut Morphology) {
    if morph.kind != "stratum" {
        return;
    }
    strip(&mut morph.content, &stratum_defaults());

    let key = SpecKind::Chunks.key();
    if let Some(specs) = morph.content.get_mut(key).and_then(Value::as_sequence_mut) {
        let defaults = chunk_spec_defaults();
        for spec in specs.iter_mut().filter_map(Value::as_mapping_mut) {
            strip(spec, &defaults);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stratum(yaml: &str) -> Morphology {
        Morphology::from_yaml("defs", "strata/s.morph", yaml).unwrap()
    }

    #[test]
    fn strips_stratum_and_chunk_defaults() {
        let mut morph = stratum(
            "name: s\nkind: stratum\ndescription: ''\nbuild-depends: []\nproducts: []\nchunks:\n- name: c\n  build-mode: staging\n  prefix: /usr\n  build-depends: []\n  submodules: {}\n",
        );
        unset_defaults(&mut morph);
        let yaml = morph.to_yaml().unwrap();
        assert_eq!(yaml, "name: s\nkind: stratum\nchunks:\n- name: c\n");
    }

    #[test]
    fn keeps_non_default_values() {
        let mut morph = stratum(
            "name: s\nkind: stratum\ndescription: tools\nbuild-depends:\n- morph: strata/core.morph\nchunks:\n- name: c\n  prefix: /tools\n  build-mode: test\n",
        );
        let before = morph.clone();
        unset_defaults(&mut morph);
        assert_eq!(morph, before);
    }

    #[test]
    fn other_kinds_are_untouched() {
        let mut morph =
            Morphology::from_yaml("defs", "systems/x.morph", "name: x\nkind: system\ndescription: ''\n")
                .unwrap();
        let before = morph.clone();
        unset_defaults(&mut morph);
        assert_eq!(morph, before);
    }
}
