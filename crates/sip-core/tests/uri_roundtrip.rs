use proptest::prelude::*;
use sipbridge_sip_core::types::param::Params;
use sipbridge_sip_core::types::uri::Uri;

fn param_value() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-zA-Z0-9.\\-]{1,8}",
        "[a-z]{1,4}[ \t][a-z]{1,4}",
    ]
}

fn params() -> impl Strategy<Value = Params> {
    prop::collection::btree_map("[a-z][a-z0-9\\-]{0,6}", param_value(), 0..4)
        .prop_map(|map| map.into_iter().collect())
}

prop_compose! {
    fn arb_uri()(
        has_scheme in any::<bool>(),
        secure in any::<bool>(),
        user in prop::option::of("[a-z0-9]{1,8}"),
        password in prop::option::of("[a-z0-9]{1,8}"),
        host in "[a-z]{1,10}\\.(com|net|org)",
        port in prop::option::of(1u16..),
        params in params(),
        queries in params(),
    ) -> Uri {
        Uri {
            secure: has_scheme && secure,
            has_scheme,
            // without a scheme, `user:password@` would read as a scheme token
            password: if has_scheme { user.as_ref().and(password) } else { None },
            user,
            host,
            port,
            params,
            queries,
        }
    }
}

proptest! {
    #[test]
    fn uri_survives_stringify_and_parse(uri in arb_uri()) {
        let text = uri.to_string();
        let reparsed: Uri = text.parse().unwrap();
        prop_assert_eq!(reparsed, uri);
    }

    #[test]
    fn host_port_round_trips(host in "[a-z]{1,10}\\.com", port in 1u16..) {
        let mut uri = Uri::new("placeholder.net");
        uri.set_host_port(&format!("{}:{}", host, port)).unwrap();
        prop_assert_eq!(uri.host_port(), format!("{}:{}", host, port));
    }
}

#[test]
fn whitespace_values_are_quoted_on_output() {
    let uri: Uri = "sip:1000:secret@192.168.4.169:40828;rinstance=e7be6d7faa64ed3f;transport=tcp?a=b&c=\"dsa\t !#$$ d\"&d=f"
        .parse()
        .unwrap();
    let text = uri.to_string();
    assert!(text.contains("c=\"dsa\t !#$$ d\""));
    assert_eq!(text.parse::<Uri>().unwrap(), uri);
}
