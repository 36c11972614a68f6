//! Encode an address-book entry and decode it back.
//!
//! Run with: `cargo run --example round_trip`

use docbind::{DocReader, DocWriter, FieldShape, RegistryBuilder};

#[derive(Debug, Default, PartialEq)]
struct Address {
    street: String,
    zip: String,
}

#[derive(Debug, Default, PartialEq)]
struct Person {
    first_name: String,
    last_name: String,
    age: i32,
    home: Address,
    nicknames: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let registry = RegistryBuilder::new()
        .register::<Address, _>("demo.Address", |b| {
            b.field(
                "street",
                FieldShape::leaf::<String>(),
                |a: &Address| &a.street,
                |a: &mut Address, v: String| a.street = v,
            )
            .field(
                "zip",
                FieldShape::leaf::<String>(),
                |a: &Address| &a.zip,
                |a: &mut Address, v: String| a.zip = v,
            );
        })
        .register::<Person, _>("demo.Person", |b| {
            b.field(
                "first_name",
                FieldShape::leaf::<String>(),
                |p: &Person| &p.first_name,
                |p: &mut Person, v: String| p.first_name = v,
            )
            .field(
                "last_name",
                FieldShape::leaf::<String>(),
                |p: &Person| &p.last_name,
                |p: &mut Person, v: String| p.last_name = v,
            )
            .field(
                "age",
                FieldShape::leaf::<i32>(),
                |p: &Person| &p.age,
                |p: &mut Person, v: i32| p.age = v,
            )
            .field(
                "home",
                FieldShape::leaf::<Address>(),
                |p: &Person| &p.home,
                |p: &mut Person, v: Address| p.home = v,
            )
            .field(
                "nicknames",
                FieldShape::sequence_of::<String>(FieldShape::leaf::<String>()),
                |p: &Person| &p.nicknames,
                |p: &mut Person, v: Vec<String>| p.nicknames = v,
            );
        })
        .build()?;

    let person = Person {
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        age: 85,
        home: Address {
            street: "Arlington".to_string(),
            zip: "22201".to_string(),
        },
        nicknames: vec!["Amazing Grace".to_string()],
    };

    let mut writer = DocWriter::new();
    registry.encode(&mut writer, &person)?;
    let bytes = writer.into_bytes();
    println!("encoded {} bytes", bytes.len());

    let decoded: Person = registry.decode(&mut DocReader::new(&bytes))?;
    println!("decoded: {decoded:?}");
    assert_eq!(decoded, person);

    Ok(())
}
