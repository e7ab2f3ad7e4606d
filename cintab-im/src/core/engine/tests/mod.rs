//! Tests for the composition engine

use super::*;

mod basic;
mod commit;

fn make_engine() -> CompositionEngine {
    let table = cintab_engine::parse(
        "\
%ename Test
%chardef begin
a 日
aa 昌
aaa 晶
ab 明
ab 朙
ab 萌
%chardef end
",
    )
    .unwrap();
    CompositionEngine::new(Arc::new(table))
}

fn make_keyname_engine() -> CompositionEngine {
    let table = cintab_engine::parse(
        "\
%keyname begin
a 日
b 月
%keyname end
%chardef begin
a 日
b 月
%chardef end
",
    )
    .unwrap();
    CompositionEngine::new(Arc::new(table))
}

/// Ten or more candidates under one code, to exercise the '0' key.
fn make_wide_engine() -> CompositionEngine {
    let chars = [
        '一', '乙', '丁', '七', '乃', '九', '了', '二', '人', '儿', '入',
    ];
    let mut content = String::from("%chardef begin\n");
    for ch in chars {
        content.push_str(&format!("z {ch}\n"));
    }
    content.push_str("%chardef end\n");
    CompositionEngine::new(Arc::new(cintab_engine::parse(&content).unwrap()))
}
