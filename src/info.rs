pub fn help() {
    println!(
        "\
tabripper - Download an Ultimate Guitar playlist as PDF or DOCX files

USAGE
    tabripper [OPTIONS] [CONFIG]

    Logs in, opens the playlist and saves every tab in it to the download
    location. CONFIG defaults to ./config.ini. Pro tabs are skipped.

OPTIONS
    -h, --help      Show this help message
    -v, --verbose   Log what is being processed in more detail

CONFIG
    [URLs]
    login_url = https://www.ultimate-guitar.com/
    playlist_url = https://www.ultimate-guitar.com/user/playlist/view?id=ID

    [Download]
    location = ~/Tabs       Output folder, created if missing (default: .)
    docx = false            Save DOCX instead of PDF

    [PDFKit]
    executable_path = /usr/local/bin/wkhtmltopdf
                            Renderer for PDF output (default: wkhtmltopdf on PATH)

    [Authentication]        Optional, missing values are asked for
    username = you
    password = secret

    [Browser]               Optional
    headless = true
    timeout = 10            Seconds to wait for a page to render
    login_timeout = 10      Seconds to wait for the login to be confirmed

ENVIRONMENT
    RUST_LOG        Overrides the log filter, e.g. RUST_LOG=tabripper=debug
"
    );
}
