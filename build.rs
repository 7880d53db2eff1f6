use anyhow::Context;
use std::env;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    // La librería del motor solo se descarga sola en Windows; en el resto
    // de plataformas se espera instalada en sistema o en la carpeta
    // configurada (PUENTE_ENGINE_PATH en tiempo de ejecución).
    #[cfg(target_os = "windows")]
    fetch_engine_library()?;

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    println!("cargo:rustc-link-search=native={}", manifest_dir);

    Ok(())
}

#[cfg(target_os = "windows")]
fn fetch_engine_library() -> anyhow::Result<()> {
    use std::fs;
    use std::io::Cursor;

    // Última versión estable publicada de PDFium para Windows x64.
    const ENGINE_URL: &str =
        "https://github.com/bblanchon/pdfium-binaries/releases/latest/download/pdfium-win-x64.zip";
    const LIBRARY_NAME: &str = "pdfium.dll";

    // La dejamos junto al manifiesto: es la carpeta por defecto donde el
    // binder busca antes de caer a las rutas de sistema.
    let target = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap()).join(LIBRARY_NAME);
    if target.exists() {
        println!("cargo:warning=Librería del motor ya presente: {:?}", target);
        return Ok(());
    }

    println!("cargo:warning=Descargando el motor desde {}...", ENGINE_URL);

    let archive = reqwest::blocking::get(ENGINE_URL)
        .context("fallo al descargar el paquete del motor")?
        .bytes()
        .context("fallo al leer el paquete descargado")?;

    let mut zip = zip::ZipArchive::new(Cursor::new(archive))
        .context("el paquete del motor no es un ZIP válido")?;

    // La DLL suele colgar de bin/, pero no dependemos de la ruta interna.
    let mut entry = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap())
        .find(|f| f.name().ends_with(LIBRARY_NAME))
        .with_context(|| format!("{} no aparece dentro del paquete", LIBRARY_NAME))?;

    let mut out = fs::File::create(&target)
        .with_context(|| format!("fallo al crear {:?}", target))?;
    std::io::copy(&mut entry, &mut out)
        .context("fallo al extraer la librería del motor")?;

    println!("cargo:warning=Motor instalado en: {:?}", target);
    Ok(())
}
