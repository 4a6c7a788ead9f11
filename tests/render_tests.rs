// Rendering tests: AST → canonical surface syntax, and the reparse law
// (rendered output parses back to an equal tree).

use bfront::ast::*;
use bfront::parser::Parser;

fn parse(source: &str) -> TranslationUnit {
    let mut parser = Parser::new("test", source).expect("parser creation failed");
    parser.parse().expect("parsing failed")
}

fn first_stmt(source: &str) -> Stmt {
    let unit = parse(&format!("f() {{ {} }}", source));
    match &unit.functions[0].body {
        Stmt::Block(nodes) => nodes[0].clone(),
        other => panic!("expected block, got {:?}", other),
    }
}

/// Render a unit and parse the result again; the trees must be equal.
fn assert_reparses(source: &str) {
    let unit = parse(source);
    let rendered = unit.to_string();
    let reparsed = parse(&rendered);
    assert_eq!(unit, reparsed, "rendered form was:\n{}", rendered);
}

// ===== Rendering =====

#[test]
fn test_render_globals() {
    let unit = parse("v ;\ntab [3] 1, 'a', \"hi\";");
    assert_eq!(unit.globals[0].to_string(), "v 0;");
    assert_eq!(unit.globals[1].to_string(), "tab [3] 1, 'a', \"hi\";");
}

#[test]
fn test_render_function_and_block() {
    let unit = parse("main() { return 0; }");
    assert_eq!(unit.functions[0].to_string(), "main() {\n\treturn 0;\n}");
}

#[test]
fn test_render_statements() {
    assert_eq!(
        first_stmt("auto a, v[4];").to_string(),
        "auto a, v[4];"
    );
    assert_eq!(
        first_stmt("extrn putchar, getchar;").to_string(),
        "extrn putchar, getchar;"
    );
    assert_eq!(
        first_stmt("if (x) break; else goto out;").to_string(),
        "if(x) break; else goto out;"
    );
    assert_eq!(first_stmt("while (1) ;").to_string(), "while(1) ;");
    assert_eq!(first_stmt("out: ;").to_string(), "out:");
    assert_eq!(first_stmt("return;").to_string(), "return ;");
    assert_eq!(first_stmt("return x;").to_string(), "return x;");
    assert_eq!(first_stmt(";").to_string(), ";");
}

#[test]
fn test_render_switch() {
    let stmt = first_stmt("switch (x) { case 1: break; default: return 0; }");
    assert_eq!(
        stmt.to_string(),
        "switch(x) {\ncase 1:\n\tbreak;\ndefault:\n\treturn 0;\n}"
    );
}

#[test]
fn test_render_expressions() {
    assert_eq!(first_stmt("x = a + b * c;").to_string(), "x = a + b * c;");
    assert_eq!(first_stmt("(a + b) * c;").to_string(), "(a + b) * c;");
    assert_eq!(first_stmt("f(a, b[1]);").to_string(), "f(a, b[1]);");
    assert_eq!(first_stmt("x++;").to_string(), "x++;");
    assert_eq!(first_stmt("!*p;").to_string(), "!*p;");
    assert_eq!(first_stmt("x =+ 1;").to_string(), "x =+ 1;");
    assert_eq!(
        first_stmt("x = a ? 1 : 2;").to_string(),
        "x = (a ? 1 : 2);"
    );
}

#[test]
fn test_render_escapes_literal_contents() {
    assert_eq!(
        first_stmt("puts(\"one\\ntwo\\t\\\"quoted\\\"\");").to_string(),
        "puts(\"one\\ntwo\\t\\\"quoted\\\"\");"
    );
    assert_eq!(first_stmt("c = '\\'';").to_string(), "c = '\\'';");
}

#[test]
fn test_grouped_rendering_shows_precedence() {
    let stmt = first_stmt("r = 1 + 2 * 3;");
    let expr = match stmt {
        Stmt::Expr(expr) => expr,
        other => panic!("expected expression, got {:?}", other),
    };
    assert_eq!(expr.grouped(), "(r = (1 + (2 * 3)))");
}

#[test]
fn test_constant_classification() {
    let unit = parse("tab [2] 1, 'x';");
    match &unit.globals[0] {
        Global::Vector { values, .. } => {
            assert!(values.iter().all(Expr::is_constant));
        }
        other => panic!("expected vector, got {:?}", other),
    }
    assert!(!Expr::Ident("x".to_string()).is_constant());
}

// ===== The reparse law =====

#[test]
fn test_reparse_globals() {
    assert_reparses("v ;\nw 42;\nc 'ab';\ns \"str\";\ntab [3] 1, 'a', \"hi\";");
}

#[test]
fn test_reparse_control_flow() {
    assert_reparses(
        "main() {
           auto i, v[10];
           extrn printn;
           i = 0;
           while (i < 10) {
             v[i] = i * i;
             i =+ 1;
           }
           if (v[9] > 50) printn(v[9]); else ;
           return i;
         }",
    );
}

#[test]
fn test_reparse_switch_and_jumps() {
    assert_reparses(
        "dispatch(code) {
           switch (code) {
           case 'q': return 0;
           case 1: goto retry;
           default: break;
           }
           retry: ;
           return 1;
         }",
    );
}

#[test]
fn test_reparse_operator_zoo() {
    assert_reparses(
        "f(a, b) {
           a = b << 2 & 7 | b >> 1 ^ 3;
           a = -b + !a - ~b;
           a =* 2;
           a =/ 2;
           b = a++ + --b;
           return a != b && a <= b || a >= b;
         }",
    );
}

#[test]
fn test_reparse_string_escapes() {
    assert_reparses("greeting \"line one\\nline two\\t\\\"end\\\"\";");
}

#[test]
fn test_reparse_is_stable_twice() {
    let unit = parse("swap(v, i, j) { auto t; t = v[i]; v[i] = v[j]; v[j] = t; }");
    let once = unit.to_string();
    let twice = parse(&once).to_string();
    assert_eq!(once, twice);
}
