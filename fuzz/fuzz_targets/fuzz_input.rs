// SPDX-License-Identifier: MIT
#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use desktop_organizer::classifier::shortcut::parse_link_target;
use desktop_organizer::classifier::ItemDescriptor;
use desktop_organizer::config::{CategoryTable, GridConfig};
use desktop_organizer::{Classifier, GridLayout};

#[derive(Arbitrary, Debug)]
struct Input {
    name: String,
    is_folder: bool,
    link: Vec<u8>,
    index: u32,
    max_columns: u32,
    cell_width: u32,
}

fuzz_target!(|input: Input| {
    let target = parse_link_target(&input.link);

    let classifier = Classifier::new(CategoryTable::default());
    let item = if input.is_folder {
        ItemDescriptor::folder(input.name.as_str())
    } else {
        ItemDescriptor::file(input.name.as_str()).with_shortcut_target(target)
    };
    let category = classifier.classify(&item);
    assert!(!category.is_empty());

    let layout = GridLayout::new(GridConfig {
        max_columns_per_category: input.max_columns,
        cell_width: input.cell_width,
        ..GridConfig::default()
    });
    let _ = layout.position(&category, input.index);
});
